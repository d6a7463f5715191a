// Escape set for remote command lines. Order matters: the backslash must be
// escaped first, otherwise the backslashes inserted for the other characters
// would themselves be escaped again.
const ESCAPE_CHARS: [char; 3] = ['\\', '"', '`'];

/// Escapes a remote path for interpolation into a shell command line and
/// wraps it in double quotes.
///
/// Every path that ends up inside a remote command string must pass through
/// this function; interpolating a raw path is a command-injection bug.
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut out = path.to_owned();

    for c in ESCAPE_CHARS {
        out = out.replace(c, &format!("\\{c}"));
    }

    format!("\"{out}\"")
}
