use std::{env, process};

use cograph::{
    BfsEngine, CographError, PathReport, SearchConfig, client::CommandLineConfig, describe_path,
    loader,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            eprint!("{}", CommandLineConfig::help());
            process::exit(2);
        }
    };

    match run(&config) {
        Ok(()) => {}
        Err(err) if err.is_no_path() => {
            println!("{err}");
            process::exit(1);
        }
        Err(err) => {
            eprintln!("search failed: {err}");
            process::exit(2);
        }
    }
}

fn run(config: &CommandLineConfig) -> Result<(), CographError> {
    let graph = loader::load_path(&config.datafile)?;
    let search = SearchConfig::new(config.workers).with_env_lock_shards()?;
    let engine = BfsEngine::new(&graph, search);
    let path = engine.search(&config.start, &config.end)?;
    if config.json {
        let report = PathReport::new(&graph, &config.start, &config.end, config.workers, &path)?;
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| CographError::invalid_argument(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }
    if path.len() == 1 {
        println!("{}", cograph::render::strip_quotes(&path[0]));
        return Ok(());
    }
    for hop in describe_path(&graph, &path)? {
        println!("{hop}");
    }
    Ok(())
}
