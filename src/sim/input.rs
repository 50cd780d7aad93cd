//! Action-level input queries
//!
//! The simulation never sees raw devices. It asks, per player slot, whether
//! an action is held or was newly pressed this frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Per-player gameplay actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
    Dash,
    Shoot,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Dash,
        Action::Shoot,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Shared actions used on the victory/defeat screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuAction {
    Confirm,
    Back,
}

/// Question interface the simulation uses for input
pub trait ActionQuery {
    fn is_held(&self, slot: usize, action: Action) -> bool;
    fn was_pressed(&self, slot: usize, action: Action) -> bool;
    fn menu_pressed(&self, action: MenuAction) -> bool;
}

/// Small bitset of [`Action`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub fn with(mut self, action: Action) -> Self {
        self.insert(action);
        self
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    #[inline]
    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        iter.into_iter().fold(ActionSet::EMPTY, ActionSet::with)
    }
}

/// Maximum player slots an input snapshot carries
pub const MAX_SLOTS: usize = 2;

/// Snapshot of all action state for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    pub held: [ActionSet; MAX_SLOTS],
    pub pressed: [ActionSet; MAX_SLOTS],
    pub confirm: bool,
    pub back: bool,
}

impl FrameInput {
    /// Press (and hold) `action` for `slot`
    pub fn press(mut self, slot: usize, action: Action) -> Self {
        if slot < MAX_SLOTS {
            self.pressed[slot].insert(action);
            self.held[slot].insert(action);
        }
        self
    }

    /// Hold `action` for `slot` without a fresh press
    pub fn hold(mut self, slot: usize, action: Action) -> Self {
        if slot < MAX_SLOTS {
            self.held[slot].insert(action);
        }
        self
    }

    /// Same held state with all one-shot presses cleared
    pub fn held_only(&self) -> Self {
        Self {
            held: self.held,
            pressed: [ActionSet::EMPTY; MAX_SLOTS],
            confirm: false,
            back: false,
        }
    }
}

impl ActionQuery for FrameInput {
    fn is_held(&self, slot: usize, action: Action) -> bool {
        self.held.get(slot).is_some_and(|set| set.contains(action))
    }

    fn was_pressed(&self, slot: usize, action: Action) -> bool {
        self.pressed.get(slot).is_some_and(|set| set.contains(action))
    }

    fn menu_pressed(&self, action: MenuAction) -> bool {
        match action {
            MenuAction::Confirm => self.confirm,
            MenuAction::Back => self.back,
        }
    }
}

/// Key codes (lower-case `KeyboardEvent.code` style) bound to each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left: String,
    pub right: String,
    pub jump: String,
    pub dash: String,
    pub shoot: String,
}

impl Controls {
    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Jump => &self.jump,
            Action::Dash => &self.dash,
            Action::Shoot => &self.shoot,
        }
    }
}

const CONFIRM_KEYS: [&str; 2] = ["enter", "space"];
const BACK_KEYS: [&str; 2] = ["keym", "escape"];

/// Key-state tracker that answers action queries through bindings.
///
/// Feed it key transitions, query during the frame, then call
/// [`KeyboardInput::next_frame`] to clear the just-pressed set.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    bindings: Vec<Controls>,
    held: HashSet<String>,
    just_pressed: HashSet<String>,
}

impl KeyboardInput {
    pub fn new(bindings: Vec<Controls>) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, code: &str) {
        let code = code.to_lowercase();
        // Auto-repeat must not count as a fresh press
        if !self.held.contains(&code) {
            self.just_pressed.insert(code.clone());
        }
        self.held.insert(code);
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(&code.to_lowercase());
    }

    pub fn is_key_held(&self, code: &str) -> bool {
        self.held.contains(&code.to_lowercase())
    }

    pub fn was_key_pressed(&self, code: &str) -> bool {
        self.just_pressed.contains(&code.to_lowercase())
    }

    pub fn next_frame(&mut self) {
        self.just_pressed.clear();
    }

    /// Freeze the current state into a [`FrameInput`]
    pub fn snapshot(&self) -> FrameInput {
        let mut frame = FrameInput {
            confirm: self.menu_pressed(MenuAction::Confirm),
            back: self.menu_pressed(MenuAction::Back),
            ..Default::default()
        };
        for slot in 0..self.bindings.len().min(MAX_SLOTS) {
            frame.held[slot] = Action::ALL
                .into_iter()
                .filter(|&a| self.is_held(slot, a))
                .collect();
            frame.pressed[slot] = Action::ALL
                .into_iter()
                .filter(|&a| self.was_pressed(slot, a))
                .collect();
        }
        frame
    }
}

impl ActionQuery for KeyboardInput {
    fn is_held(&self, slot: usize, action: Action) -> bool {
        self.bindings
            .get(slot)
            .is_some_and(|controls| self.is_key_held(controls.key_for(action)))
    }

    fn was_pressed(&self, slot: usize, action: Action) -> bool {
        self.bindings
            .get(slot)
            .is_some_and(|controls| self.was_key_pressed(controls.key_for(action)))
    }

    fn menu_pressed(&self, action: MenuAction) -> bool {
        let keys = match action {
            MenuAction::Confirm => CONFIRM_KEYS,
            MenuAction::Back => BACK_KEYS,
        };
        keys.iter().any(|key| self.was_key_pressed(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PLAYER_PRESETS;

    fn keyboard() -> KeyboardInput {
        KeyboardInput::new(PLAYER_PRESETS.iter().map(|p| p.controls()).collect())
    }

    #[test]
    fn test_action_set() {
        let set: ActionSet = [Action::Left, Action::Shoot].into_iter().collect();
        assert!(set.contains(Action::Left));
        assert!(set.contains(Action::Shoot));
        assert!(!set.contains(Action::Jump));
        assert!(ActionSet::EMPTY.is_empty());
    }

    #[test]
    fn test_frame_input_slots() {
        let input = FrameInput::default()
            .press(0, Action::Jump)
            .hold(1, Action::Right);
        assert!(input.was_pressed(0, Action::Jump));
        assert!(input.is_held(0, Action::Jump));
        assert!(input.is_held(1, Action::Right));
        assert!(!input.was_pressed(1, Action::Right));
        // Unknown slot is never active
        assert!(!input.is_held(5, Action::Right));

        let held = input.held_only();
        assert!(!held.was_pressed(0, Action::Jump));
        assert!(held.is_held(0, Action::Jump));
    }

    #[test]
    fn test_keyboard_just_pressed_clears() {
        let mut kb = keyboard();
        kb.key_down("KeyW");
        assert!(kb.was_pressed(0, Action::Jump));
        assert!(kb.is_held(0, Action::Jump));
        assert!(!kb.was_pressed(1, Action::Jump));

        kb.next_frame();
        assert!(!kb.was_pressed(0, Action::Jump));
        assert!(kb.is_held(0, Action::Jump));

        // Repeat while held is not a new press
        kb.key_down("keyw");
        assert!(!kb.was_pressed(0, Action::Jump));

        kb.key_up("keyw");
        assert!(!kb.is_held(0, Action::Jump));
    }

    #[test]
    fn test_keyboard_snapshot_and_menu() {
        let mut kb = keyboard();
        kb.key_down("ArrowLeft");
        kb.key_down("Enter");
        let frame = kb.snapshot();
        assert!(frame.is_held(1, Action::Left));
        assert!(frame.was_pressed(1, Action::Left));
        // Enter is also player two's shoot binding
        assert!(frame.was_pressed(1, Action::Shoot));
        assert!(frame.confirm);
        assert!(!frame.back);
    }
}
