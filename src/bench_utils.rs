//! Seeded synthetic co-appearance datasets for tests and benches.
//!
//! A dataset is a list of `<entity>\t<group>` rows, the same shape the loader
//! reads, so turning one into a [`Graph`] goes through [`loader::load_reader`].
//! Every group label is unique and its rows are consecutive. An entity that
//! no generated group casts gets a single-member group so that it is still a
//! vertex of the loaded graph.

use std::io::Cursor;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{errors::CographError, graph::Graph, loader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Appearance {
    pub entity: usize,
    pub group: String,
}

#[derive(Clone, Debug)]
pub struct CoAppearanceDataset {
    pub entities: Vec<String>,
    pub rows: Vec<Appearance>,
}

impl CoAppearanceDataset {
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.entities[idx]
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::with_capacity(self.rows.len() * 16);
        for row in &self.rows {
            out.push_str(&self.entities[row.entity]);
            out.push('\t');
            out.push_str(&row.group);
            out.push('\n');
        }
        out
    }

    pub fn load(&self) -> Result<Graph, CographError> {
        loader::load_reader(Cursor::new(self.to_tsv().into_bytes()))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum DatasetShape {
    /// Entity `i` shares a `LINK` issue with `i + 1`. Every third link is
    /// also reprinted under a second label, giving parallel edges.
    Chain,
    /// Entities laid out `width` to a row; horizontal and vertical
    /// neighbours share a two-member issue.
    Lattice { width: usize },
    /// `groups` issues, each casting 2 to `max_cast` uniformly drawn entities.
    Random { groups: usize, max_cast: usize },
    /// `groups` issues of `cast` members. Half the draws repeat an earlier
    /// appearance, so frequently cast entities become hubs.
    Popular { groups: usize, cast: usize },
}

pub fn generate_dataset(
    shape: DatasetShape,
    entity_count: usize,
    seed: u64,
) -> CoAppearanceDataset {
    assert!(entity_count > 1, "entity_count must exceed 1");
    let width = entity_count.to_string().len();
    // zero padding keeps lexicographic order equal to index order
    let entities: Vec<String> = (0..entity_count)
        .map(|idx| format!("E{idx:0width$}"))
        .collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let groups = match shape {
        DatasetShape::Chain => chain_groups(entity_count),
        DatasetShape::Lattice { width } => lattice_groups(entity_count, width),
        DatasetShape::Random { groups, max_cast } => {
            random_groups(entity_count, groups, max_cast, &mut rng)
        }
        DatasetShape::Popular { groups, cast } => {
            popular_groups(entity_count, groups, cast, &mut rng)
        }
    };

    let mut cast_once = vec![false; entity_count];
    let mut rows = Vec::new();
    for (group, members) in groups {
        for entity in members {
            cast_once[entity] = true;
            rows.push(Appearance {
                entity,
                group: group.clone(),
            });
        }
    }
    for (entity, _) in cast_once.iter().enumerate().filter(|(_, cast)| !**cast) {
        rows.push(Appearance {
            entity,
            group: format!("SOLO-{entity}"),
        });
    }
    CoAppearanceDataset { entities, rows }
}

type Group = (String, Vec<usize>);

fn chain_groups(count: usize) -> Vec<Group> {
    let mut groups = Vec::with_capacity(count + count / 3);
    for idx in 0..count - 1 {
        groups.push((format!("LINK-{idx}"), vec![idx, idx + 1]));
        if idx % 3 == 0 {
            groups.push((format!("REPRINT-{idx}"), vec![idx + 1, idx]));
        }
    }
    groups
}

fn lattice_groups(count: usize, width: usize) -> Vec<Group> {
    assert!(width > 0, "lattice width must be positive");
    let mut groups = Vec::with_capacity(count * 2);
    for idx in 0..count {
        if idx % width + 1 < width && idx + 1 < count {
            groups.push((format!("ROW-{idx}"), vec![idx, idx + 1]));
        }
        if idx + width < count {
            groups.push((format!("COL-{idx}"), vec![idx, idx + width]));
        }
    }
    groups
}

fn random_groups(count: usize, groups: usize, max_cast: usize, rng: &mut StdRng) -> Vec<Group> {
    let max_cast = max_cast.clamp(2, count);
    (0..groups)
        .map(|group| {
            let size = rng.gen_range(2..=max_cast);
            let members = draw_cast(size, || rng.gen_range(0..count));
            (format!("ISSUE-{group}"), members)
        })
        .collect()
}

fn popular_groups(count: usize, groups: usize, cast: usize, rng: &mut StdRng) -> Vec<Group> {
    let size = cast.clamp(2, count);
    let mut appearances: Vec<usize> = Vec::with_capacity(groups * size);
    let mut out = Vec::with_capacity(groups);
    for group in 0..groups {
        let members = draw_cast(size, || {
            if !appearances.is_empty() && rng.gen_bool(0.5) {
                appearances[rng.gen_range(0..appearances.len())]
            } else {
                rng.gen_range(0..count)
            }
        });
        appearances.extend(&members);
        out.push((format!("ISSUE-{group}"), members));
    }
    out
}

/// Draws until `size` distinct entities are cast. `size` never exceeds the
/// entity count.
fn draw_cast(size: usize, mut draw: impl FnMut() -> usize) -> Vec<usize> {
    let mut members = Vec::with_capacity(size);
    while members.len() < size {
        let pick = draw();
        if !members.contains(&pick) {
            members.push(pick);
        }
    }
    members
}
