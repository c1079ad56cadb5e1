#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub datafile: String,
    pub start: String,
    pub end: String,
    pub workers: usize,
    pub json: bool,
}

impl CommandLineConfig {
    /// Parses `<datafile> <start> <end> <workers> [--json]`. `args[0]` is the
    /// program name.
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut json = false;
        let mut positional = Vec::new();
        for arg in args.iter().skip(1) {
            match *arg {
                "--json" => json = true,
                other if other.starts_with("--") => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => positional.push(arg.to_string()),
            }
        }
        let [datafile, start, end, workers]: [String; 4] = positional
            .try_into()
            .map_err(|rest: Vec<String>| format!("expected 4 arguments, got {}", rest.len()))?;
        let workers = workers
            .parse::<usize>()
            .map_err(|e| format!("invalid worker count {workers}: {e}"))?;
        if workers == 0 {
            return Err("worker count must be positive".to_string());
        }
        Ok(Self {
            datafile,
            start,
            end,
            workers,
            json,
        })
    }

    pub fn help() -> &'static str {
        "Usage: cograph <datafile> <start> <end> <workers> [--json]\n"
    }
}
