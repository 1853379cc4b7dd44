use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::sim::MovementIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Sprint,
    Crouch,
    Jump,
    TurnLeft,
    TurnRight,
    Quit,
}

const ACTION_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn movement_intent(&self) -> MovementIntent {
        MovementIntent {
            forward: self.is_down(InputAction::MoveForward),
            back: self.is_down(InputAction::MoveBack),
            left: self.is_down(InputAction::MoveLeft),
            right: self.is_down(InputAction::MoveRight),
            sprint: self.is_down(InputAction::Sprint),
            crouch: self.is_down(InputAction::Crouch),
            jump: self.is_down(InputAction::Jump),
            turn_left: self.is_down(InputAction::TurnLeft),
            turn_right: self.is_down(InputAction::TurnRight),
        }
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveForward => 0,
            InputAction::MoveBack => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Sprint => 4,
            InputAction::Crouch => 5,
            InputAction::Jump => 6,
            InputAction::TurnLeft => 7,
            InputAction::TurnRight => 8,
            InputAction::Quit => 9,
        }
    }
}

/// Physical key bindings. Unbound keys return `None`.
pub fn action_for_key(key: KeyCode) -> Option<InputAction> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveForward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveBack),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(InputAction::Sprint),
        KeyCode::KeyC => Some(InputAction::Crouch),
        KeyCode::Space => Some(InputAction::Jump),
        KeyCode::KeyQ => Some(InputAction::TurnLeft),
        KeyCode::KeyE => Some(InputAction::TurnRight),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

/// Set of currently held bound keys. Events only flip membership; actions
/// are derived on `sample`, so two keys bound to one action stay consistent
/// when only one of them is released.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    pressed: HashSet<KeyCode>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` on the transition from released to pressed.
    pub fn on_key_down(&mut self, key: KeyCode) -> bool {
        if action_for_key(key).is_none() {
            return false;
        }
        self.pressed.insert(key)
    }

    pub fn on_key_up(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub(crate) fn sample(&self) -> ActionStates {
        let mut states = ActionStates::default();
        for action in self.pressed.iter().filter_map(|key| action_for_key(*key)) {
            states.set(action, true);
        }
        states
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.sample().is_down(action)
    }

    pub fn movement_intent(&self) -> MovementIntent {
        self.sample().movement_intent()
    }
}
