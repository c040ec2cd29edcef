use anyhow::Context as _;
use anyhow::Result;
use std::fs;
use std::io;
use std::io::Write as _;
use std::num::NonZeroUsize;

const USAGE: &str = "Usage: domain-gen [options] -e out.elements -n out.vertices";

fn create(path: &str) -> Result<io::BufWriter<fs::File>> {
    let file = fs::File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    Ok(io::BufWriter::new(file))
}

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optopt("x", "columns", "number of cells along x (default: 1)", "NUMBER");
    options.optopt("y", "rows", "number of cells along y (default: 1)", "NUMBER");
    options.optopt("e", "elements", "output element file", "FILE");
    options.optopt("n", "vertices", "output vertex file", "FILE");

    let matches = polydomain_tools::parse_args(options, USAGE, 0)?;
    let _chrome_trace_guard = polydomain_tools::set_up_tracing(&matches);

    let one = NonZeroUsize::MIN;
    let columns: NonZeroUsize = matches
        .opt_get("x")
        .context("invalid value for option 'columns'")?
        .unwrap_or(one);
    let rows: NonZeroUsize = matches
        .opt_get("y")
        .context("invalid value for option 'rows'")?
        .unwrap_or(one);
    let element_file = matches
        .opt_str("e")
        .context("missing required option 'elements'")?;
    let vertex_file = matches
        .opt_str("n")
        .context("missing required option 'vertices'")?;

    let (elements, nodes) = polydomain::generate::rectangle(columns, rows);
    eprintln!(" -> Vertices: {}", nodes.len());
    eprintln!(" -> Elements: {}", elements.len());

    let mut w = create(&element_file)?;
    polydomain::files::write_elements(&mut w, &elements)
        .and_then(|()| w.flush())
        .context("failed to write elements")?;

    let mut w = create(&vertex_file)?;
    polydomain::files::write_vertices(&mut w, &nodes)
        .and_then(|()| w.flush())
        .context("failed to write vertices")?;

    Ok(())
}
