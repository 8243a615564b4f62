use clap::*;
use std::io::Write;

use super::utils;
use urec::libs::phylo::cost::DlCost;
use urec::libs::phylo::unrooted::{MARK_OPT, MARK_OPT_MATE};
use urec::libs::phylo::writer::{
    write_attributes, write_newick, write_rootings, write_species_details, write_subtree,
    write_tree_details,
};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("reconcile")
        .about("Reconcile unrooted gene trees with rooted species trees")
        .after_help(
            r###"
For every (gene tree, species tree) pair, finds the rooting of the gene
tree minimizing the duplication/loss cost of the reconciliation, then
prints the requested per-pair results and per-species summaries.

Input format:
* Newick trees, one per line in files; leaf labels may carry a
  "[species=NAME]" attribute, otherwise the label itself (up to the
  first ' ', '[' or ':') is the species

Examples:
1. Optimal cost of one pair:
   urec reconcile -g '((a,c),b)' -s '((a,b),c)' --min-cost

2. Optimal rootings for a set of gene trees:
   urec reconcile -G genes.nwk -s '((a,b),c)' --min-rooting

3. Loss distribution over the species tree:
   urec reconcile -G genes.nwk -S species.nwk --dl-total --distributions
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
            Arg::new("print-gene")
                .long("print-gene")
                .short('p')
                .action(ArgAction::SetTrue)
                .help("Echo each gene tree in canonical Newick"),
        )
        .arg(
            Arg::new("print-species")
                .long("print-species")
                .short('P')
                .action(ArgAction::SetTrue)
                .help("Echo each species tree in canonical Newick"),
        )
        .arg(
            Arg::new("rootings")
                .long("rootings")
                .short('R')
                .action(ArgAction::SetTrue)
                .help("Print every rooting of each gene tree"),
        )
        .arg(
            Arg::new("min-cost")
                .long("min-cost")
                .action(ArgAction::SetTrue)
                .help("Print the optimal (dup,loss) cost of each pair"),
        )
        .arg(
            Arg::new("min-rooting")
                .long("min-rooting")
                .action(ArgAction::SetTrue)
                .help("Print the gene tree rooted at the optimal edge"),
        )
        .arg(
            Arg::new("mappings")
                .long("mappings")
                .short('a')
                .action(ArgAction::SetTrue)
                .help("Dump per-corner subtree costs, edge costs and mappings"),
        )
        .arg(
            Arg::new("details")
                .long("details")
                .short('A')
                .action(ArgAction::SetTrue)
                .help("Add rooted subtree views to the mapping dump"),
        )
        .arg(
            Arg::new("attributes")
                .long("attributes")
                .short('X')
                .action(ArgAction::SetTrue)
                .help("Print the gene tree with cost/mark attributes on every corner"),
        )
        .arg(
            Arg::new("total")
                .long("total")
                .short('c')
                .action(ArgAction::SetTrue)
                .help("Per species tree: total mutation cost over all gene trees"),
        )
        .arg(
            Arg::new("dl-total")
                .long("dl-total")
                .short('C')
                .action(ArgAction::SetTrue)
                .help("Per species tree: total (dup,loss) over all gene trees"),
        )
        .arg(
            Arg::new("distributions")
                .long("distributions")
                .short('d')
                .action(ArgAction::SetTrue)
                .help("Per species tree: per-node dup/loss detail lines"),
        )
        .arg(
            Arg::new("tree-distributions")
                .long("tree-distributions")
                .short('x')
                .action(ArgAction::SetTrue)
                .help("Per species tree: nested notation with dup/loss attributes"),
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
    //----------------------------
    // Args
    //----------------------------
    let mut writer = urec::writer(args.get_one::<String>("outfile").unwrap());
    let weights = utils::weights(args);

    let mut genes = utils::gene_trees(args)?;
    let mut species = utils::species_trees(args)?;

    let show_mappings = args.get_flag("mappings");
    let show_details = args.get_flag("details");
    let show_min_cost = args.get_flag("min-cost");
    let show_min_rooting = args.get_flag("min-rooting");
    let show_attributes = args.get_flag("attributes");
    let show_total = args.get_flag("total");
    let show_dl_total = args.get_flag("dl-total");
    let show_distributions = args.get_flag("distributions");
    let show_tree_distributions = args.get_flag("tree-distributions");

    //----------------------------
    // Echoes
    //----------------------------
    if args.get_flag("print-gene") {
        for gene in &genes {
            let rooted = gene.rooted_at(gene.start().unwrap());
            writeln!(writer, "{}", write_newick(&rooted))?;
        }
    }

    if args.get_flag("print-species") {
        for st in &species {
            writeln!(writer, "{}", write_newick(st.tree()))?;
        }
    }

    if args.get_flag("rootings") {
        for gene in &genes {
            write!(writer, "{}", write_rootings(gene))?;
        }
    }

    let needs_optimum = show_min_cost
        || show_min_rooting
        || show_attributes
        || show_total
        || show_dl_total
        || show_distributions
        || show_tree_distributions;

    if !(needs_optimum || show_mappings) {
        return Ok(());
    }

    //----------------------------
    // Reconciliation
    //----------------------------
    for st in species.iter_mut() {
        let mut total = DlCost::default();

        for gene in genes.iter_mut() {
            gene.clear();

            if show_mappings {
                for id in 0..gene.len() {
                    if gene.is_leaf(id) {
                        let label = gene.corner(id).species.clone().unwrap_or_default();
                        writeln!(writer, "** leaf {}", label)?;
                    } else {
                        writeln!(writer, "** int")?;
                    }
                    if show_details {
                        let own = gene.subtree_rooted(id);
                        writeln!(writer, "  {}", write_subtree(&own, own.get_root().unwrap()))?;
                        if let Some(p) = gene.corner(id).parent {
                            let mate = gene.subtree_rooted(p);
                            writeln!(
                                writer,
                                "  p={}",
                                write_subtree(&mate, mate.get_root().unwrap())
                            )?;
                        }
                    }

                    let sc = gene.subtree_cost(id, st)?;
                    let cost = gene.edge_cost(id, st)?;
                    let mapped = gene.mapping(id, st)?;
                    let own = gene.subtree_rooted(id);
                    writeln!(
                        writer,
                        "\t sc={}\t cost={}\t {} ==> {}",
                        sc,
                        cost,
                        write_subtree(&own, own.get_root().unwrap()),
                        write_subtree(st.tree(), mapped)
                    )?;
                }
            }

            if !needs_optimum {
                continue;
            }

            let optimal = gene.find_optimal_edge(st)?;

            if show_min_rooting {
                writeln!(writer, "{}", write_newick(&gene.rooted_at(optimal)))?;
            }

            if show_min_cost {
                writeln!(writer, "{}", gene.edge_cost(optimal, st)?)?;
            }

            if show_attributes {
                if let Some(p) = gene.corner(optimal).parent {
                    gene.mark(p, MARK_OPT | MARK_OPT_MATE);
                }
                gene.mark(optimal, MARK_OPT);
                writeln!(writer, "{}", write_attributes(gene, st)?)?;
            }

            if show_total || show_dl_total {
                total = total + gene.edge_cost(optimal, st)?;
            }

            if show_distributions || show_tree_distributions {
                gene.attribute_details(optimal, st)?;
            }
        }

        //----------------------------
        // Per-species summary
        //----------------------------
        if show_total || show_dl_total || show_distributions {
            write!(writer, "{}\t", write_newick(st.tree()))?;
            if show_total {
                write!(writer, "{}\t", total.mut_cost(&weights))?;
            }
            if show_dl_total {
                write!(writer, "{}\t", total)?;
            }
            writeln!(writer)?;
        }

        if show_distributions {
            write!(writer, "{}", write_species_details(st))?;
        }
        if show_tree_distributions {
            writeln!(writer, "{}", write_tree_details(st))?;
        }
    }

    Ok(())
}
