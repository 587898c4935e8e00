//! Directory-level view over a flat recursive tree listing.
//!
//! The hosting API returns every path of a commit in one flat list. The
//! structure route only shows one directory at a time, so this module picks
//! out the entries sitting exactly one segment below a base path.
//!
//! Used by: `routes::structure`

use crate::models::{ChildEntry, TreeEntry};

/// Returns the direct children of `base_path`, in listing order.
///
/// An empty `base_path` means the repository root. A non-empty one must not
/// carry a trailing slash. Paths with no match yield an empty view.
pub fn children(listing: &[TreeEntry], base_path: &str) -> Vec<ChildEntry> {
    if base_path.is_empty() {
        return listing
            .iter()
            .filter(|entry| !entry.path.contains('/'))
            .map(to_child)
            .collect();
    }

    let prefix = format!("{}/", base_path);
    listing
        .iter()
        .filter(|entry| entry.path != base_path)
        .filter(|entry| {
            entry
                .path
                .strip_prefix(&prefix)
                .is_some_and(|relative| !relative.contains('/'))
        })
        .map(to_child)
        .collect()
}

fn to_child(entry: &TreeEntry) -> ChildEntry {
    ChildEntry {
        path: entry.path.clone(),
        kind: entry.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;

    fn sample_listing() -> Vec<TreeEntry> {
        vec![
            TreeEntry::new("a.txt", EntryKind::Blob, "s1"),
            TreeEntry::new("dir/b.txt", EntryKind::Blob, "s2"),
            TreeEntry::new("dir/sub/c.txt", EntryKind::Blob, "s3"),
            TreeEntry::new("dir", EntryKind::Tree, "s4"),
        ]
    }

    fn child(path: &str, kind: EntryKind) -> ChildEntry {
        ChildEntry {
            path: path.to_string(),
            kind,
        }
    }

    #[test]
    fn test_root_keeps_only_top_level_entries_in_order() {
        // Arrange
        let listing = sample_listing();

        // Act
        let view = children(&listing, "");

        // Assert
        assert_eq!(
            view,
            vec![child("a.txt", EntryKind::Blob), child("dir", EntryKind::Tree)]
        );
    }

    #[test]
    fn test_directory_excludes_itself_and_deeper_descendants() {
        // Arrange
        let listing = sample_listing();

        // Act
        let view = children(&listing, "dir");

        // Assert
        assert_eq!(view, vec![child("dir/b.txt", EntryKind::Blob)]);
    }

    #[test]
    fn test_nested_directory_implied_only_by_blobs() {
        // Arrange
        let listing = sample_listing();

        // Act
        let view = children(&listing, "dir/sub");

        // Assert
        assert_eq!(view, vec![child("dir/sub/c.txt", EntryKind::Blob)]);
    }

    #[test]
    fn test_unknown_path_yields_empty_view() {
        // Arrange
        let listing = sample_listing();

        // Act
        let view = children(&listing, "missing");

        // Assert
        assert!(view.is_empty());
    }

    #[test]
    fn test_empty_listing_yields_empty_view() {
        assert!(children(&[], "").is_empty());
        assert!(children(&[], "dir").is_empty());
    }

    #[test]
    fn test_sibling_with_shared_name_prefix_is_not_a_child() {
        // Arrange
        let listing = vec![
            TreeEntry::new("dir2/x.txt", EntryKind::Blob, "s1"),
            TreeEntry::new("dir/y.txt", EntryKind::Blob, "s2"),
        ];

        // Act
        let view = children(&listing, "dir");

        // Assert
        assert_eq!(view, vec![child("dir/y.txt", EntryKind::Blob)]);
    }

    #[test]
    fn test_duplicates_pass_through_and_results_are_stable() {
        // Arrange
        let listing = vec![
            TreeEntry::new("dir/a", EntryKind::Blob, "s1"),
            TreeEntry::new("dir/a", EntryKind::Blob, "s1"),
            TreeEntry::new("dir/mod", EntryKind::Commit, "s2"),
        ];

        // Act
        let first = children(&listing, "dir");
        let second = children(&listing, "dir");

        // Assert
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[2].kind, EntryKind::Commit);
    }

    #[test]
    fn test_every_result_is_exactly_one_level_below_base() {
        // Arrange
        let listing = vec![
            TreeEntry::new("a", EntryKind::Tree, "1"),
            TreeEntry::new("a/b", EntryKind::Tree, "2"),
            TreeEntry::new("a/b/c", EntryKind::Tree, "3"),
            TreeEntry::new("a/b/c/d.rs", EntryKind::Blob, "4"),
            TreeEntry::new("a/b/e.rs", EntryKind::Blob, "5"),
            TreeEntry::new("f.rs", EntryKind::Blob, "6"),
        ];

        for base in ["", "a", "a/b", "a/b/c", "a/b/c/d.rs", "f.rs"] {
            // Act
            let view = children(&listing, base);

            // Assert
            for entry in &view {
                let relative = if base.is_empty() {
                    entry.path.as_str()
                } else {
                    entry
                        .path
                        .strip_prefix(&format!("{base}/"))
                        .expect("child must sit under base")
                };
                assert!(!relative.is_empty());
                assert!(!relative.contains('/'), "{} is too deep for {base}", entry.path);
            }
        }
        assert_eq!(children(&listing, "a/b").len(), 2);
    }
}
