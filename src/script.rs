//! Remote command builders
//!
//! Pure functions from structured step parameters to opaque shell command
//! strings. The orchestrator issues these strings and inspects exit
//! statuses; their internal correctness is the remote host's concern.
//! Steps are chained with `&&` so a failing sub-command surfaces as a
//! non-zero exit status instead of being masked by a later one.

use std::path::Path;

use crate::config::InstallDirective;

/// Quote a string for safe use in shell commands.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Quote a path for safe use in shell commands.
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

fn in_venv(stamped_path: &Path, command: &str) -> String {
    format!(
        "cd {} && . venv/bin/activate && {}",
        quote_path(stamped_path),
        command
    )
}

/// Phase 1, step 1: make sure the code base path exists.
pub fn ensure_base_dir(code_path: &Path) -> String {
    format!("mkdir -p {}", quote_path(code_path))
}

/// Phase 1, step 2: clone the repository at the target branch into the
/// stamped directory, submodules included.
pub fn clone_repository(
    code_path: &Path,
    branch: &str,
    repository: &str,
    stamped_dir: &str,
) -> String {
    format!(
        "cd {} && git clone --recursive --verbose -b {} {} {}",
        quote_path(code_path),
        quote(branch),
        quote(repository),
        quote(stamped_dir)
    )
}

/// Phase 1, step 3: build the virtualenv inside the checkout.
pub fn create_venv(stamped_path: &Path, python: &str) -> String {
    format!(
        "cd {} && {} -m venv venv",
        quote_path(stamped_path),
        quote(python)
    )
}

/// Phase 1, step 4 (flag-controlled): upgrade pip itself.
pub fn upgrade_pip(stamped_path: &Path) -> String {
    in_venv(stamped_path, "pip install -U pip")
}

/// Phase 1, step 5: install dependencies from exactly one directive.
pub fn install_dependencies(stamped_path: &Path, directive: &InstallDirective) -> String {
    let install = match directive {
        InstallDirective::Requirements(path) => {
            format!("pip install --ignore-installed -r {}", quote(path))
        }
        InstallDirective::Pip(spec) => format!("pip install {}", quote(spec)),
    };
    in_venv(stamped_path, &format!("pip install -U wheel && {install}"))
}

/// Phase 1, step 6 (flag-controlled): collect static assets.
pub fn collect_static(stamped_path: &Path, settings_module: &str) -> String {
    in_venv(
        stamped_path,
        &format!(
            "python manage.py collectstatic --noinput --settings={}",
            quote(settings_module)
        ),
    )
}

/// Phase 1, step 7 (flag-controlled): SELinux relabeling for
/// RedHat / CentOS hosts serving through httpd.
pub fn selinux_relabel(stamped_path: &Path) -> String {
    let p = quote_path(stamped_path);
    format!(
        "chcon -Rv --type=httpd_sys_content_t {p} > /dev/null && \
         find {p}/venv/ \\( -name '*.so' -o -name '*.so.*' \\) \
         -exec chcon -Rv --type=httpd_sys_script_exec_t {{}} \\; > /dev/null"
    )
}

/// Phase 2, step 1: atomically repoint the stable symlink.
///
/// `ln -sfn` replaces the link in a single rename, never
/// delete-then-recreate.
pub fn repoint_symlink(stamped_path: &Path, stable_path: &Path) -> String {
    format!(
        "ln -sfn {} {}",
        quote_path(stamped_path),
        quote_path(stable_path)
    )
}

/// Phase 2, pruning: list stamped siblings of the stable path, one per line.
///
/// The glob requires a `-` plus at least one character after the stable
/// name, so the symlink itself never appears in the listing.
pub fn list_deployments(stable_path: &Path) -> String {
    format!("ls -1d {}-*", quote_path(stable_path))
}

/// Phase 2, pruning: delete one retired deployment directory.
pub fn remove_deployment(path: &str) -> String {
    format!("rm -rf -- {}", quote(path))
}

/// Phase 2, final step on the last server: the migration hook.
pub fn run_migrations(stamped_path: &Path, settings_module: &str) -> String {
    in_venv(
        stamped_path,
        &format!(
            "python manage.py migrate --noinput --settings={}",
            quote(settings_module)
        ),
    )
}
