//! Resolution of mesh references against an explicit base directory.

use std::path::{Path, PathBuf};

const PACKAGE_SCHEME: &str = "package://";
const FILE_SCHEME: &str = "file://";

/// Resolve a URDF mesh `filename` to an existing file.
///
/// - `package://pkg/rest`: the first ancestor of `base_dir` (itself
///   included) that either is named `pkg` or contains a `pkg` directory.
/// - `file://path`: the scheme is stripped.
/// - relative paths are joined onto `base_dir`.
///
/// Returns `None` when nothing on disk matches.
pub fn resolve_mesh_path(filename: &str, base_dir: &Path) -> Option<PathBuf> {
    if let Some(rest) = filename.strip_prefix(PACKAGE_SCHEME) {
        let (package, relative) = rest.split_once('/')?;
        return base_dir.ancestors().find_map(|dir| {
            let package_dir = if dir.file_name().is_some_and(|n| n == package) {
                dir.to_path_buf()
            } else {
                dir.join(package)
            };
            let candidate = package_dir.join(relative);
            candidate.is_file().then_some(candidate)
        });
    }

    let path = Path::new(filename.strip_prefix(FILE_SCHEME).unwrap_or(filename));
    let candidate = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"solid").unwrap();
    }

    #[test]
    fn resolves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("meshes/base.stl"));
        assert_eq!(
            resolve_mesh_path("meshes/base.stl", tmp.path()),
            Some(tmp.path().join("meshes/base.stl"))
        );
        assert_eq!(resolve_mesh_path("meshes/missing.stl", tmp.path()), None);
    }

    #[test]
    fn resolves_package_inside_ancestor() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("my_robot/meshes/arm.dae"));
        let urdf_dir = tmp.path().join("my_robot/urdf");
        fs::create_dir_all(&urdf_dir).unwrap();

        // The URDF lives inside the package: ancestor named `my_robot`.
        assert_eq!(
            resolve_mesh_path("package://my_robot/meshes/arm.dae", &urdf_dir),
            Some(tmp.path().join("my_robot/meshes/arm.dae"))
        );
        // The URDF lives next to the package.
        assert_eq!(
            resolve_mesh_path("package://my_robot/meshes/arm.dae", tmp.path()),
            Some(tmp.path().join("my_robot/meshes/arm.dae"))
        );
        assert_eq!(resolve_mesh_path("package://other/meshes/arm.dae", &urdf_dir), None);
        assert_eq!(resolve_mesh_path("package://bare", &urdf_dir), None);
    }

    #[test]
    fn strips_file_scheme() {
        let tmp = tempfile::tempdir().unwrap();
        let mesh = tmp.path().join("wheel.obj");
        touch(&mesh);
        let uri = format!("file://{}", mesh.display());
        assert_eq!(resolve_mesh_path(&uri, Path::new("/nonexistent")), Some(mesh));
    }
}
