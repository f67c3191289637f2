//! `mount.cifs` style rendering.
//!
//! Reference: mount.cifs(8). Options go into one comma-joined `-o` string.

use super::{path_arg, Invocation, PurgeStep, Removal, Renderer};
use crate::options::{OptionSet, OptionValue, CREDENTIAL_OPTIONS};
use smb_error::DriverResult;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixRenderer;

impl UnixRenderer {
    /// Build the `-o` value: credentials first, then the rest by name, `ro` last.
    pub fn mount_options(options: &OptionSet) -> Vec<String> {
        let mut out = Vec::new();

        for name in CREDENTIAL_OPTIONS {
            if let Some(value) = options.get_string(name) {
                out.push(format!("{}={}", name, value));
            }
        }

        for (name, value) in options.entries() {
            if CREDENTIAL_OPTIONS.contains(&name) {
                continue;
            }
            match value {
                OptionValue::Bool(true) => out.push(name.to_string()),
                OptionValue::Bool(false) => {}
                other => out.push(format!("{}={}", name, other)),
            }
        }

        if options.read_only() {
            out.push("ro".to_string());
        }
        out
    }
}

impl Renderer for UnixRenderer {
    fn attach(
        &self,
        source: &str,
        target: &Path,
        options: &OptionSet,
    ) -> DriverResult<Vec<Invocation>> {
        let mut args = vec![
            "-t".to_string(),
            "cifs".to_string(),
            source.to_string(),
            path_arg(target),
        ];
        let mount_options = Self::mount_options(options);
        if !mount_options.is_empty() {
            args.push("-o".to_string());
            args.push(mount_options.join(","));
        }
        Ok(vec![Invocation::new("mount", args)])
    }

    fn detach(&self, target: &Path, _remote: Option<&str>) -> Vec<Invocation> {
        vec![Invocation::new("umount", ["-l".to_string(), path_arg(target)])]
    }

    fn keeps_link(&self) -> bool {
        false
    }

    fn check(&self, mount_point: &str) -> Invocation {
        Invocation::new("mountpoint", ["-q", mount_point])
    }

    fn purge(&self, entry: &Path) -> PurgeStep {
        PurgeStep {
            unmount: Some(Invocation::new(
                "umount",
                ["-l".to_string(), "-f".to_string(), path_arg(entry)],
            )),
            removal: Removal::Dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RawOptions;

    fn set(pairs: &[(&str, OptionValue)]) -> OptionSet {
        let raw: RawOptions = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        OptionSet::normalize(&raw)
    }

    #[test]
    fn attach_renders_full_vector() {
        let options = set(&[
            ("password", "p".into()),
            ("vers", "3.0".into()),
            ("username", "u".into()),
            ("uid", 1000i64.into()),
            ("nounix", true.into()),
            ("serverino", false.into()),
        ]);

        let inv = UnixRenderer
            .attach("//host/share", Path::new("/mnt/x"), &options)
            .unwrap();

        assert_eq!(
            inv,
            vec![Invocation::new(
                "mount",
                [
                    "-t",
                    "cifs",
                    "//host/share",
                    "/mnt/x",
                    "-o",
                    "username=u,password=p,nounix,uid=1000,vers=3.0",
                ]
            )]
        );
    }

    #[test]
    fn attach_without_options_omits_flag() {
        let inv = UnixRenderer
            .attach("//host/share", Path::new("/mnt/x"), &OptionSet::default())
            .unwrap();
        assert_eq!(inv[0].args, vec!["-t", "cifs", "//host/share", "/mnt/x"]);
    }

    #[test]
    fn read_only_aliases_collapse_to_one_flag() {
        let cases = [
            (vec![("readonly", true.into())], true),
            (vec![("ro", true.into())], true),
            (vec![("readonly", true.into()), ("ro", true.into())], true),
            (vec![("readonly", false.into())], false),
            (vec![], false),
        ];

        for (pairs, expect_ro) in cases {
            let opts = UnixRenderer::mount_options(&set(&pairs));
            let count = opts.iter().filter(|o| o.as_str() == "ro").count();
            assert_eq!(count, usize::from(expect_ro), "{:?}", pairs);
            assert!(!opts.iter().any(|o| o.starts_with("readonly")));
        }
    }

    #[test]
    fn rendering_is_repeatable() {
        let options = set(&[
            ("username", "u".into()),
            ("password", "p".into()),
            ("file_mode", "0777".into()),
            ("dir_mode", "0777".into()),
            ("ro", true.into()),
        ]);
        let first = UnixRenderer
            .attach("//host/share", Path::new("/mnt/x"), &options)
            .unwrap();
        let second = UnixRenderer
            .attach("//host/share", Path::new("/mnt/x"), &options.clone())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn detach_check_and_purge() {
        assert_eq!(
            UnixRenderer.detach(Path::new("target"), None),
            vec![Invocation::new("umount", ["-l", "target"])]
        );
        assert_eq!(
            UnixRenderer.check("/mnt/x"),
            Invocation::new("mountpoint", ["-q", "/mnt/x"])
        );

        let step = UnixRenderer.purge(Path::new("/var/vcap/data/some/path/guid"));
        assert_eq!(
            step.unmount,
            Some(Invocation::new(
                "umount",
                ["-l", "-f", "/var/vcap/data/some/path/guid"]
            ))
        );
        assert_eq!(step.removal, Removal::Dir);
    }
}
