extern crate clap;
use clap::*;

mod cmd_urec;

fn main() -> anyhow::Result<()> {
    let app = Command::new("urec")
        .version(crate_version!())
        .about("`urec` - Unrooted REConciliation of gene trees with species trees")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_urec::reconcile::make_subcommand())
        .subcommand(cmd_urec::vote::make_subcommand())
        .subcommand(cmd_urec::gen::make_subcommand())
        .after_help(
            r###"
For every rooting of an unrooted gene tree, reconciliation with a rooted
species tree implies a duplication/loss cost; `urec` finds the rooting
minimizing that cost without enumerating all edges.

Subcommands:

* reconcile - costs, optimal rootings, and summaries for (gene, species) pairs
* vote      - distribute one vote per gene tree among the best species trees
* gen       - random unrooted gene trees

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("reconcile", sub_matches)) => cmd_urec::reconcile::execute(sub_matches),
        Some(("vote", sub_matches)) => cmd_urec::vote::execute(sub_matches),
        Some(("gen", sub_matches)) => cmd_urec::gen::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
