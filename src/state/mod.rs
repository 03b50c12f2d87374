use std::collections::BTreeSet;

/// Element that held keyboard focus before the palette was engaged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusTarget(pub String);

/// A creation request in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCreation {
    pub ticket: u64,
    pub type_name: String,
    /// Fixed when the request starts; not revalidated on completion.
    pub index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CreationState {
    #[default]
    Idle,
    Requesting(PendingCreation),
    Inserted {
        block_id: String,
        index: usize,
    },
    Failed {
        type_name: String,
        index: usize,
        reason: String,
    },
}

/// A palette entry copied into a list by a drop, awaiting creation.
///
/// The copy occupies a slot in the list it was dropped into, so sortable
/// destinations in that list count it until a creation succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub type_name: String,
    /// Block index the creation was requested for.
    pub index: usize,
    /// Group block whose item list holds the copy; `None` for the block list.
    pub group: Option<String>,
    /// Number of real nodes ahead of the copy in its list.
    pub gap: usize,
}

impl Placeholder {
    pub fn sits_in(&self, group: Option<&str>) -> bool {
        self.group.as_deref() == group
    }

    /// A node at `index` left the placeholder's list.
    pub(crate) fn node_left(&mut self, index: usize) {
        if index < self.gap {
            self.gap -= 1;
        }
    }

    /// Map a sortable destination, which counts the copy, to a list index for
    /// a node that just entered the list, and move the gap past it if needed.
    pub(crate) fn node_entered(&mut self, destination: usize) -> usize {
        if destination > self.gap {
            destination - 1
        } else {
            self.gap += 1;
            destination
        }
    }
}

/// Interaction state for one editing session.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Block after which a click/keyboard creation inserts.
    pub selected_index: Option<usize>,

    /// Block whose add affordance is highlighted.
    pub add_active: Option<String>,

    pub prev_focus: Option<FocusTarget>,

    pub creation: CreationState,

    /// Placeholder left in a drop target; cleared only by a successful creation.
    pub placeholder: Option<Placeholder>,

    /// Regions that lost their empty hint on focus and get re-checked on blur.
    pub(crate) checking_regions: BTreeSet<String>,

    next_ticket: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self.creation, CreationState::Requesting(_))
    }

    pub fn pending(&self) -> Option<&PendingCreation> {
        match &self.creation {
            CreationState::Requesting(p) => Some(p),
            _ => None,
        }
    }

    /// Remember the most recent focus; the last call wins.
    pub fn note_focus(&mut self, target: FocusTarget) {
        self.prev_focus = Some(target);
    }

    pub(crate) fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_index = None;
        self.add_active = None;
    }
}
