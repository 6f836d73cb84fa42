//! `--select` lists: 1-based indices and inclusive ranges, e.g. `1,3-5`.

use anyhow::{bail, Context, Result};

/// Parses `spec` into 0-based indices, in the order given, without duplicates.
/// Every index must be within `1..=len`.
pub fn parse_selection(spec: &str, len: usize) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_index(a, part)?, parse_index(b, part)?),
            None => {
                let n = parse_index(part, part)?;
                (n, n)
            }
        };
        if start > end {
            bail!("invalid range {:?}: start is after end", part);
        }
        if end > len {
            bail!("selection {:?} is out of range (1-{})", part, len);
        }
        for n in start..=end {
            if !out.contains(&(n - 1)) {
                out.push(n - 1);
            }
        }
    }
    if out.is_empty() {
        bail!("empty selection");
    }
    Ok(out)
}

fn parse_index(s: &str, part: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .with_context(|| format!("invalid selection {:?}", part))?;
    if n == 0 {
        bail!("invalid selection {:?}: indices start at 1", part);
    }
    Ok(n)
}
