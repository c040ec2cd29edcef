use anyhow::Context as _;
use anyhow::Result;
use polydomain::Graph;
use polydomain::WeightedGraph;

const USAGE: &str = "Usage: domain-graph [options] -o out.matrix";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    polydomain_tools::domain_options(&mut options);
    options.optflag("w", "weighted", "weigh edges by inverse squared length");
    options.optflag("b", "binary", "save the matrix in the compressed format");
    options.optopt("o", "output", "output matrix file", "FILE");

    let matches = polydomain_tools::parse_args(options, USAGE, 0)?;
    let _chrome_trace_guard = polydomain_tools::set_up_tracing(&matches);

    let output = matches
        .opt_str("o")
        .context("missing required option 'output'")?;
    let domain = polydomain_tools::load_domain(&matches)?;
    eprintln!("{domain}");

    let adjacency = if matches.opt_present("w") {
        let graph = WeightedGraph::new(&domain);
        eprintln!("{graph}");
        graph.into_adjacency_matrix()
    } else {
        let graph = Graph::new(&domain);
        eprintln!("{graph}");
        graph.into_adjacency_matrix()
    };

    adjacency
        .save(&output, matches.opt_present("b"))
        .with_context(|| format!("failed to save matrix to {output:?}"))?;
    eprintln!(" -> Saved {adjacency} to {output}");

    Ok(())
}
