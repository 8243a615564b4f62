use anyhow::{bail, Context};
use clap::*;
use std::io::Write;

use urec::libs::phylo::random::{random_sequential, random_uniform};
use urec::libs::phylo::writer::write_newick;
use urec::libs::phylo::SpeciesTree;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("gen")
        .about("Generate random unrooted gene trees")
        .after_help(
            r###"
Two modes:

* sequential (default): --len subtrees are chained onto a backbone;
  each subtree branches with probability --prob, decayed by --decay at
  every level
* uniform (--num-leaves and/or --unique): a uniform random binary tree
  on the drawn leaves

Leaf labels come from --labels or from the leaves of a species tree.

Examples:
1. Ten quick trees over three species:
   urec gen --labels a,b,c

2. Uniform trees on all species of a tree, each species once:
   urec gen --species-file species.nwk --unique --count 100
"###,
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .short('r')
                .num_args(1)
                .help("Comma-separated label pool"),
        )
        .arg(
            Arg::new("species-file")
                .long("species-file")
                .short('S')
                .num_args(1)
                .help("Draw labels from the leaves of this species tree"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('l')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Number of trees to generate"),
        )
        .arg(
            Arg::new("len")
                .long("len")
                .short('n')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("2")
                .help("Backbone length in sequential mode"),
        )
        .arg(
            Arg::new("prob")
                .long("prob")
                .short('i')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("0.5")
                .help("Probability of an internal node"),
        )
        .arg(
            Arg::new("decay")
                .long("decay")
                .short('e')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("0.75")
                .help("Decay of the branching probability per level"),
        )
        .arg(
            Arg::new("num-leaves")
                .long("num-leaves")
                .short('E')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Number of leaves (uniform mode)"),
        )
        .arg(
            Arg::new("unique")
                .long("unique")
                .short('u')
                .action(ArgAction::SetTrue)
                .help("Use each label at most once (uniform mode)"),
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

    let labels: Vec<String> = if let Some(csv) = args.get_one::<String>("labels") {
        csv.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else if let Some(file) = args.get_one::<String>("species-file") {
        let lines = urec::read_lines(file);
        let first = lines
            .iter()
            .find(|line| !line.trim().is_empty())
            .context("empty species file")?;
        SpeciesTree::from_newick(first)?.leaf_labels()
    } else {
        bail!("a label pool is required (--labels or --species-file)");
    };
    if labels.is_empty() {
        bail!("empty label pool");
    }

    let count = *args.get_one::<usize>("count").unwrap();
    let len = *args.get_one::<usize>("len").unwrap();
    let prob = *args.get_one::<f64>("prob").unwrap();
    let decay = *args.get_one::<f64>("decay").unwrap();
    let num_leaves = args.get_one::<usize>("num-leaves").copied();
    let unique = args.get_flag("unique");

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let tree = if num_leaves.is_some() || unique {
            random_uniform(num_leaves, unique, &labels, &mut rng)
        } else {
            random_sequential(len, prob, decay, &labels, &mut rng)
        };
        let rooted = tree.rooted_at(tree.start().unwrap());
        writeln!(writer, "{}", write_newick(&rooted))?;
    }

    Ok(())
}
