use anyhow::Context as _;
use anyhow::Result;
use polydomain::MeshDomain;
use polydomain::Node;
use std::env;
use std::num::NonZeroUsize;
use std::process;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

/// Parses the command line, with `-h, --help` and `-t, --trace` added to the
/// given options.
///
/// Prints the usage and exits when help is requested.
pub fn parse_args(
    mut options: getopts::Options,
    usage: &str,
    max_free_args: usize,
) -> Result<getopts::Matches> {
    options.optflag("h", "help", "print this help menu");
    options.optopt("t", "trace", "emit a chrome trace", "FILE");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(usage));
        process::exit(1);
    }
    if max_free_args < matches.free.len() {
        anyhow::bail!(
            "expected at most {max_free_args} free arguments, got {}",
            matches.free.len(),
        );
    }

    Ok(matches)
}

/// Prints events filtered by the `LOG` environment variable to stderr, and
/// to a chrome trace if `-t` was given.
///
/// The returned guard must be kept alive until the end of the program, for
/// the trace to be complete.
pub fn set_up_tracing(matches: &getopts::Matches) -> Option<tracing_chrome::FlushGuard> {
    let registry = Registry::default().with(EnvFilter::from_env("LOG")).with(
        HierarchicalLayer::new(4)
            .with_thread_ids(true)
            .with_targets(true)
            .with_bracketed_fields(true),
    );
    match matches.opt_str("t") {
        Some(filename) => {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(filename)
                .build();
            registry.with(chrome_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Adds the options read by [`load_domain`].
pub fn domain_options(options: &mut getopts::Options) {
    options.optopt("e", "elements", "element file", "FILE");
    options.optopt("n", "vertices", "vertex file", "FILE");
    options.optopt(
        "r",
        "rectangle",
        "use a structured mesh of the unit square instead of files",
        "COLUMNSxROWS",
    );
}

/// Builds the domain given either by `-r` or by the pair `-e`, `-n`.
pub fn load_domain(matches: &getopts::Matches) -> Result<MeshDomain> {
    if let Some(definition) = matches.opt_str("r") {
        if matches.opt_present("e") || matches.opt_present("n") {
            anyhow::bail!("option 'rectangle' conflicts with 'elements' and 'vertices'");
        }
        let (columns, rows) = parse_rectangle(&definition)
            .with_context(|| format!("invalid rectangle {definition:?}"))?;
        return MeshDomain::rectangle(columns, rows).context("failed to build the domain");
    }

    let element_file = matches
        .opt_str("e")
        .context("missing required option 'elements' (or 'rectangle')")?;
    let vertex_file = matches
        .opt_str("n")
        .context("missing required option 'vertices' (or 'rectangle')")?;
    MeshDomain::from_files(&element_file, &vertex_file)
        .with_context(|| format!("failed to load domain from {element_file:?} and {vertex_file:?}"))
}

/// Parses a `COLUMNSxROWS` pair, like `4x3`.
pub fn parse_rectangle(definition: &str) -> Result<(NonZeroUsize, NonZeroUsize)> {
    let (columns, rows) = definition
        .split_once(['x', 'X'])
        .context("expected COLUMNSxROWS")?;
    let columns = columns
        .trim()
        .parse()
        .with_context(|| format!("{columns:?} is not a positive integer"))?;
    let rows = rows
        .trim()
        .parse()
        .with_context(|| format!("{rows:?} is not a positive integer"))?;
    Ok((columns, rows))
}

/// Parses a query point given as two whitespace-separated floats.
pub fn parse_point(line: &str) -> Result<Node> {
    let mut coordinates = line.split_whitespace().map(|coordinate| {
        coordinate
            .parse::<f64>()
            .with_context(|| format!("{coordinate:?} is not a valid float"))
    });
    let x = coordinates.next().context("missing x coordinate")??;
    let y = coordinates.next().context("missing y coordinate")??;
    if coordinates.next().is_some() {
        anyhow::bail!("expected two coordinates");
    }
    Ok(Node::new(x, y))
}

/// Builds a 32-byte seed out of a user-given string, padded with zeros.
pub fn seed(s: &str) -> [u8; 32] {
    let mut seed = [0_u8; 32];
    for (byte, s_byte) in seed.iter_mut().zip(s.bytes()) {
        *byte = s_byte;
    }
    seed
}
