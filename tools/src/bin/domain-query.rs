use anyhow::Context as _;
use anyhow::Result;
use itertools::Itertools as _;
use itertools::MinMaxResult;
use polydomain::MeshDomain;
use polydomain::Node;
use rand::Rng as _;
use rand::SeedableRng as _;
use std::io;
use std::io::BufRead as _;
use std::io::Write as _;

const USAGE: &str = "Usage: domain-query [options] <points.txt >closest.txt";

fn bounds(values: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => anyhow::bail!("domain has no vertices"),
        MinMaxResult::OneElement(value) => Ok((value, value)),
        MinMaxResult::MinMax(min, max) => Ok((min, max)),
    }
}

/// Points drawn uniformly in the bounding box of the domain.
fn random_points(domain: &MeshDomain, count: usize, seed: &str) -> Result<Vec<Node>> {
    let (xmin, xmax) = bounds(domain.vertices().iter().map(|node| node.x))?;
    let (ymin, ymax) = bounds(domain.vertices().iter().map(|node| node.y))?;
    let mut rng = rand_pcg::Pcg64::from_seed(polydomain_tools::seed(seed));
    Ok((0..count)
        .map(|_| Node::new(rng.gen_range(xmin..=xmax), rng.gen_range(ymin..=ymax)))
        .collect())
}

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    polydomain_tools::domain_options(&mut options);
    options.optflag(
        "",
        "all",
        "compare all elements instead of searching around the closest vertex",
    );
    options.optopt(
        "",
        "random",
        "query random points of the bounding box instead of reading stdin",
        "COUNT",
    );
    options.optopt("", "seed", "seed of the random points", "BYTES");

    let matches = polydomain_tools::parse_args(options, USAGE, 0)?;
    let _chrome_trace_guard = polydomain_tools::set_up_tracing(&matches);

    let domain = polydomain_tools::load_domain(&matches)?;
    eprintln!("{domain}");
    let compare_all_elements = matches.opt_present("all");

    let points: Vec<Node> = match matches
        .opt_get::<usize>("random")
        .context("invalid value for option 'random'")?
    {
        Some(count) => {
            let seed = matches.opt_str("seed").unwrap_or_default();
            random_points(&domain, count, &seed)?
        }
        None => io::stdin()
            .lock()
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |line| !line.trim().is_empty()))
            .map(|(i, line)| {
                let line = line.context("failed to read stdin")?;
                polydomain_tools::parse_point(&line)
                    .with_context(|| format!("invalid point at line {}", i + 1))
            })
            .collect::<Result<_>>()?,
    };

    let stdout = io::stdout();
    let mut stdout = io::BufWriter::new(stdout.lock());
    for point in points {
        let closest = domain
            .closest_element(point, compare_all_elements)
            .with_context(|| format!("no closest element for {point}"))?;
        writeln!(stdout, "{}\t{}", closest.element, closest.distance)?;
    }
    stdout.flush()?;

    Ok(())
}
