use ratatui::widgets::ListState;

// ── Navigation model ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
}

const fn entry(id: &'static str, label: &'static str) -> MenuEntry {
    MenuEntry { id, label }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuSection {
    pub title: &'static str,
    pub entries: &'static [MenuEntry],
}

pub const ACTIONS: &[MenuEntry] = &[
    entry("accounts", "Account"),
    entry("upgrade", "Upgrade"),
    entry("install", "Install"),
];

pub const LIBRARY_TITLE: &str = "Library";
pub const LIBRARY_PLACEHOLDER: &str = "Your saved items will appear here";

const HOME_SECTIONS: &[MenuSection] = &[MenuSection {
    title: "Home",
    entries: &[
        entry("finance", "Finance"),
        entry("travel", "Travel"),
        entry("academic", "Academic"),
    ],
}];

const DISCOVER_SECTIONS: &[MenuSection] = &[MenuSection {
    title: "Discover",
    entries: &[
        entry("for_you", "For You"),
        entry("top", "Top"),
        entry("tech_science", "Tech & Science"),
        entry("finance", "Finance"),
        entry("arts_culture", "Arts and Culture"),
        entry("sports_entertainment", "Sports and Entertainment"),
    ],
}];

const SPACES_SECTIONS: &[MenuSection] = &[
    MenuSection {
        title: "Spaces",
        entries: &[
            entry("templates", "Templates"),
            entry("create_new_space", "+ Create New Space"),
        ],
    },
    MenuSection {
        title: "Private",
        entries: &[entry("new_space", "New space")],
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Discover,
    Spaces,
}

impl NavItem {
    pub fn all() -> [NavItem; 3] {
        [NavItem::Home, NavItem::Discover, NavItem::Spaces]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Home     => "Home",
            NavItem::Discover => "Discover",
            NavItem::Spaces   => "Spaces",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NavItem::Home     => "⌂",
            NavItem::Discover => "◎",
            NavItem::Spaces   => "◫",
        }
    }

    pub fn sections(&self) -> &'static [MenuSection] {
        match self {
            NavItem::Home     => HOME_SECTIONS,
            NavItem::Discover => DISCOVER_SECTIONS,
            NavItem::Spaces   => SPACES_SECTIONS,
        }
    }

    /// All submenu entries in display order, across sections.
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.sections().iter().flat_map(|s| s.entries.iter().copied()).collect()
    }
}

// ── Sidebar state ─────────────────────────────────────────────────────────────

/// Below this terminal width the sidebar collapses to icons.
pub const COLLAPSE_BELOW_WIDTH: u16 = 90;

pub struct Sidebar {
    pub selected: NavItem,
    pub expanded: bool,
    pub entry_state: ListState,
    pub clicked: Option<&'static str>,
    pub collapsed: bool,
    /// Set once the user toggles collapse by hand; disables auto-collapse.
    pub pinned: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            selected: NavItem::Home,
            expanded: false,
            entry_state: ListState::default(),
            clicked: None,
            collapsed: false,
            pinned: false,
        }
    }

    pub fn select_previous(&mut self) {
        let items = NavItem::all();
        let i = items.iter().position(|n| *n == self.selected).unwrap_or(0);
        self.select(items[i.saturating_sub(1)]);
    }

    pub fn select_next(&mut self) {
        let items = NavItem::all();
        let i = items.iter().position(|n| *n == self.selected).unwrap_or(0);
        self.select(items[(i + 1).min(items.len() - 1)]);
    }

    fn select(&mut self, item: NavItem) {
        if item != self.selected {
            self.selected = item;
            self.entry_state.select(if self.expanded { Some(0) } else { None });
        }
    }

    pub fn expand(&mut self) {
        self.expanded = true;
        if self.entry_state.selected().is_none() {
            self.entry_state.select(Some(0));
        }
    }

    pub fn close(&mut self) {
        self.expanded = false;
        self.entry_state.select(None);
    }

    pub fn entry_previous(&mut self) {
        let i = self.entry_state.selected().unwrap_or(0).saturating_sub(1);
        self.entry_state.select(Some(i));
    }

    pub fn entry_next(&mut self) {
        let max = self.selected.entries().len().saturating_sub(1);
        let i = (self.entry_state.selected().unwrap_or(0) + 1).min(max);
        self.entry_state.select(Some(i));
    }

    /// Mark the highlighted submenu entry as clicked and return it.
    pub fn activate(&mut self) -> Option<MenuEntry> {
        let i = self.entry_state.selected()?;
        let entry = self.selected.entries().get(i).copied()?;
        self.clicked = Some(entry.id);
        Some(entry)
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
        self.pinned = true;
        if self.collapsed {
            self.close();
        }
    }

    /// Follow the terminal width unless the user pinned a choice.
    pub fn fit_width(&mut self, width: u16) {
        if !self.pinned {
            self.collapsed = width < COLLAPSE_BELOW_WIDTH;
            if self.collapsed {
                self.close();
            }
        }
    }
}
