use crate::{InstallState, InstalledLookup, ResultSet};

/// Rewrites each record's install state from the authoritative lookup.
///
/// Ids present in `installed` become `Installed`; everything else becomes
/// `NotInstalled`. Count and order are unchanged.
pub fn merge_install_state(mut results: ResultSet, installed: &dyn InstalledLookup) -> ResultSet {
    for record in results.records_mut() {
        let state = if installed.is_installed(record.id()) {
            InstallState::Installed
        } else {
            InstallState::NotInstalled
        };
        record.set_install_state(state);
    }
    results
}
