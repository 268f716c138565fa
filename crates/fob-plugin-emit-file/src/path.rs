//! Output path resolution
//!
//! An emitted file name is resolved against the output directory and then made
//! relative to it again, so `dist/a.txt` under base `dist`, `/abs/dist/a.txt`
//! under base `/abs/dist` and `./x/../a.txt` all land on the same asset key.

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

use crate::error::{EmitFileError, Result};

/// Resolve `name` to an asset key relative to `base`
///
/// The current directory is only consulted when `name` is absolute and `base`
/// is not. Keys always use `/` as separator.
pub fn resolve_output_path(base: &Path, name: &str) -> Result<String> {
    let name = Path::new(name);

    let base = if name.is_absolute() && !base.is_absolute() {
        std::env::current_dir()
            .map_err(EmitFileError::current_dir)?
            .join(base)
    } else {
        base.to_path_buf()
    };

    let base = base.clean();
    let target = base.join(name).clean();

    Ok(to_slash(&relative_to(&base, &target)))
}

/// Lexical path from `base` to `target`; both must already be cleaned
fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target: Vec<Component<'_>> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Different roots (e.g. another drive); nothing to be relative to
    let rooted = target
        .first()
        .is_some_and(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
    if common == 0 && rooted {
        return target.iter().collect();
    }

    let mut relative = PathBuf::new();
    for _ in &base[common..] {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(resolve_output_path(Path::new(""), "out.txt").unwrap(), "out.txt");
        assert_eq!(
            resolve_output_path(Path::new("dist"), "out.txt").unwrap(),
            "out.txt"
        );
    }

    #[test]
    fn test_nested_name_is_normalized() {
        assert_eq!(
            resolve_output_path(Path::new("dist"), "./meta/../meta/info.json").unwrap(),
            "meta/info.json"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_name_under_output_root() {
        let base = Path::new("/srv/app/dist");
        let absolute = resolve_output_path(base, "/srv/app/dist/sub/a.txt").unwrap();
        let relative = resolve_output_path(base, "sub/a.txt").unwrap();
        assert_eq!(absolute, "sub/a.txt");
        assert_eq!(absolute, relative);
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_name_outside_output_root() {
        let base = Path::new("/srv/app/dist");
        assert_eq!(
            resolve_output_path(base, "/srv/app/public/robots.txt").unwrap(),
            "../public/robots.txt"
        );
    }

    #[test]
    fn test_name_escaping_relative_base() {
        assert_eq!(
            resolve_output_path(Path::new("dist"), "../escape.txt").unwrap(),
            "../escape.txt"
        );
        assert_eq!(
            resolve_output_path(Path::new("../out"), "../x.txt").unwrap(),
            "../x.txt"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_name_with_relative_base_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let name = cwd.join("dist").join("a.txt");
        assert_eq!(
            resolve_output_path(Path::new("dist"), name.to_str().unwrap()).unwrap(),
            "a.txt"
        );
    }
}
