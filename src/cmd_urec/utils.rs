use anyhow::bail;
use clap::ArgMatches;
use urec::libs::phylo::{CostWeights, SpeciesTree, UnrootedTree};

/// Collect Newick strings from repeatable inline options and an
/// optional file (one tree per line; blank lines skipped).
pub fn newick_inputs(args: &ArgMatches, opt: &str, file_opt: &str) -> Vec<String> {
    let mut inputs = Vec::new();
    if let Some(values) = args.get_many::<String>(opt) {
        inputs.extend(values.cloned());
    }
    if let Some(file) = args.get_one::<String>(file_opt) {
        inputs.extend(
            urec::read_lines(file)
                .into_iter()
                .filter(|line| !line.trim().is_empty()),
        );
    }
    inputs
}

pub fn gene_trees(args: &ArgMatches) -> anyhow::Result<Vec<UnrootedTree>> {
    let inputs = newick_inputs(args, "gene", "gene-file");
    if inputs.is_empty() {
        bail!("no gene trees given (-g/--gene or -G/--gene-file)");
    }
    inputs
        .iter()
        .map(|text| UnrootedTree::from_newick(text).map_err(anyhow::Error::from))
        .collect()
}

pub fn species_trees(args: &ArgMatches) -> anyhow::Result<Vec<SpeciesTree>> {
    let inputs = newick_inputs(args, "species", "species-file");
    if inputs.is_empty() {
        bail!("no species trees given (-s/--species or -S/--species-file)");
    }
    inputs
        .iter()
        .map(|text| SpeciesTree::from_newick(text).map_err(anyhow::Error::from))
        .collect()
}

pub fn weights(args: &ArgMatches) -> CostWeights {
    CostWeights {
        dup: *args.get_one::<f64>("dup-weight").unwrap(),
        loss: *args.get_one::<f64>("loss-weight").unwrap(),
    }
}
