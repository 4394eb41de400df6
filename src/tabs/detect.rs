use crate::shell::{ShellWindowEntry, WindowHandle};
use std::collections::HashSet;

/// Picks the view created by a new-tab command out of the current shell
/// window list.
///
/// Only entries absent from `before` are considered. An unnavigated view on
/// the same top-level window is preferred; failing that, any unnavigated view
/// whose name is one of `home_labels`.
pub fn find_new_tab_view(
    before: &[ShellWindowEntry],
    current: &[ShellWindowEntry],
    target: WindowHandle,
    home_labels: &[String],
) -> Option<ShellWindowEntry> {
    let known = before
        .iter()
        .map(|entry| (entry.handle, entry.location_url.as_str()))
        .collect::<HashSet<_>>();
    let fresh = current
        .iter()
        .filter(|entry| !known.contains(&(entry.handle, entry.location_url.as_str())))
        .filter(|entry| entry.is_unnavigated())
        .collect::<Vec<_>>();

    fresh
        .iter()
        .find(|entry| entry.handle == target)
        .or_else(|| {
            fresh.iter().find(|entry| {
                home_labels
                    .iter()
                    .any(|label| label == &entry.location_name)
            })
        })
        .map(|entry| (*entry).clone())
}
