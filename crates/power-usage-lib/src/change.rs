use crate::data_structures::{Granularity, Snapshot};

/// Which of the three record lists differ between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub daylist: bool,
    pub monthlist: bool,
    pub yearlist: bool,
}

impl SnapshotDiff {
    pub fn all() -> Self {
        Self {
            daylist: true,
            monthlist: true,
            yearlist: true,
        }
    }

    pub fn any(&self) -> bool {
        self.daylist || self.monthlist || self.yearlist
    }

    pub fn changed_lists(&self) -> Vec<Granularity> {
        let mut lists = Vec::new();
        if self.daylist {
            lists.push(Granularity::Day);
        }
        if self.monthlist {
            lists.push(Granularity::Month);
        }
        if self.yearlist {
            lists.push(Granularity::Year);
        }
        lists
    }
}

/// Decides whether a newly observed snapshot differs from the stored one.
///
/// Comparison is per record and in list order, so a reordered list counts as
/// a change even when its content is identical.
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn has_changed(&self, previous: Option<&Snapshot>, next: &Snapshot) -> bool {
        self.diff(previous, next).any()
    }

    pub fn diff(&self, previous: Option<&Snapshot>, next: &Snapshot) -> SnapshotDiff {
        match previous {
            None => SnapshotDiff::all(),
            Some(previous) => SnapshotDiff {
                daylist: previous.daylist() != next.daylist(),
                monthlist: previous.monthlist() != next.monthlist(),
                yearlist: previous.yearlist() != next.yearlist(),
            },
        }
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}
