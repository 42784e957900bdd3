//! `debian/rules` and the launcher installed into `/usr/bin`.

use crate::config::PackageConfig;

/// debhelper makefile. Recipe lines must be tab-indented.
pub fn render_rules(pkg: &PackageConfig, debian_version: &str) -> String {
    let prefix = pkg.install_prefix.trim_end_matches('/');
    let sources = pkg.pip_sources.join(" ");
    format!(
        "#!/usr/bin/make -f\n\
         # {name} {version}: virtualenv under {prefix}, launcher in /usr/bin.\n\
         \n\
         export DH_VERBOSE = 1\n\
         PKG_ROOT := $(CURDIR)/debian/{name}\n\
         PREFIX := {prefix}\n\
         \n\
         %:\n\
         \tdh $@\n\
         \n\
         override_dh_auto_build:\n\
         \n\
         override_dh_auto_test:\n\
         \n\
         override_dh_auto_install:\n\
         \tpython3 -m venv $(PKG_ROOT)$(PREFIX)\n\
         \t$(PKG_ROOT)$(PREFIX)/bin/pip install --no-cache-dir {sources}\n\
         \tinstall -D -m 0755 debian/{binary} $(PKG_ROOT)/usr/bin/{binary}\n\
         \n\
         override_dh_strip:\n\
         \n\
         override_dh_shlibdeps:\n",
        name = pkg.name,
        version = debian_version,
        prefix = prefix,
        sources = sources,
        binary = pkg.binary,
    )
}

/// Shell launcher that runs the entry module with the bundled interpreter.
pub fn render_launcher(pkg: &PackageConfig) -> String {
    format!(
        "#!/usr/bin/env bash\n{}/bin/python -m {} \"$@\"\n",
        pkg.install_prefix.trim_end_matches('/'),
        pkg.entry_module
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_recipes_are_tab_indented() {
        let rules = render_rules(&PackageConfig::default(), "0.2.1-1");
        assert!(rules.starts_with("#!/usr/bin/make -f\n"));
        assert!(rules.contains("%:\n\tdh $@\n"));
        assert!(rules.contains("PREFIX := /opt/az\n"));
        assert!(rules.contains(
            "\t$(PKG_ROOT)$(PREFIX)/bin/pip install --no-cache-dir src/azure-cli-core src/azure-cli\n"
        ));
        assert!(rules.contains("debian/az $(PKG_ROOT)/usr/bin/az\n"));
        for line in rules.lines() {
            assert!(!line.starts_with(' '), "space-indented line: {line:?}");
        }
    }

    #[test]
    fn launcher_runs_entry_module() {
        let mut pkg = PackageConfig::default();
        pkg.install_prefix = "/opt/az/".to_string();
        assert_eq!(
            render_launcher(&pkg),
            "#!/usr/bin/env bash\n/opt/az/bin/python -m azure.cli \"$@\"\n"
        );
    }
}
