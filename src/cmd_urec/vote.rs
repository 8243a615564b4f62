use clap::*;
use itertools::Itertools;
use std::io::Write;

use super::utils;
use urec::libs::phylo::writer::write_newick;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("vote")
        .about("Distribute one vote per gene tree among the best species trees")
        .after_help(
            r###"
For each gene tree, every species tree is scored by the optimal
reconciliation cost; the species trees tied at the minimum share that
gene tree's single vote equally. Prints one line per species tree:
its canonical Newick and its tally.

Examples:
1. Two candidate species trees:
   urec vote -G genes.nwk -s '((a,b),(c,d))' -s '(((a,b),c),d)'
"###,
        )
        .arg(
            Arg::new("gene")
                .long("gene")
                .short('g')
                .num_args(1)
                .action(ArgAction::Append)
                .help("An unrooted gene tree, Newick"),
        )
        .arg(
            Arg::new("gene-file")
                .long("gene-file")
                .short('G')
                .num_args(1)
                .help("File with one gene tree per line. [stdin] for standard input"),
        )
        .arg(
            Arg::new("species")
                .long("species")
                .short('s')
                .num_args(1)
                .action(ArgAction::Append)
                .help("A rooted species tree, Newick"),
        )
        .arg(
            Arg::new("species-file")
                .long("species-file")
                .short('S')
                .num_args(1)
                .help("File with one species tree per line. [stdin] for standard input"),
        )
        .arg(
            Arg::new("dup-weight")
                .long("dup-weight")
                .short('D')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("1.0")
                .help("Weight of gene duplications"),
        )
        .arg(
            Arg::new("loss-weight")
                .long("loss-weight")
                .short('L')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("1.0")
                .help("Weight of gene losses"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = urec::writer(args.get_one::<String>("outfile").unwrap());
    let weights = utils::weights(args);

    let mut genes = utils::gene_trees(args)?;
    let mut species = utils::species_trees(args)?;

    let mut tallies = vec![0.0f64; species.len()];

    for gene in genes.iter_mut() {
        let mut scores = Vec::with_capacity(species.len());
        for st in species.iter_mut() {
            gene.clear();
            let optimal = gene.find_optimal_edge(st)?;
            scores.push(gene.edge_cost(optimal, st)?.mut_cost(&weights));
        }

        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let ties = scores.iter().filter(|&&score| score == min).count();
        for (tally, &score) in tallies.iter_mut().zip_eq(&scores) {
            if score == min {
                *tally += 1.0 / ties as f64;
            }
        }
    }

    for (st, tally) in species.iter().zip_eq(&tallies) {
        writeln!(writer, "{}\t{}", write_newick(st.tree()), tally)?;
    }

    Ok(())
}
