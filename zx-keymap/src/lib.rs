//! Shared keymap definitions for the ZX Spectrum matrix keyboard.
//!
//! This crate is `no_std`-compatible so the same tables drive both the
//! scanner daemon on the Pi and the host-side layout tool.

#![cfg_attr(not(test), no_std)]

/// Number of address (row) lines in the matrix.
pub const ROWS: usize = 8;
/// Number of data (column) lines in the matrix.
pub const COLS: usize = 5;

/// Keys the virtual keyboard can emit.
///
/// Discriminants are the Linux input-event codes from
/// `linux/input-event-codes.h`, so a `Key` converts to the uinput key
/// identifier with a plain cast.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Key {
    Escape = 1,

    // Numbers
    N1 = 2,
    N2 = 3,
    N3 = 4,
    N4 = 5,
    N5 = 6,
    N6 = 7,
    N7 = 8,
    N8 = 9,
    N9 = 10,
    N0 = 11,

    // Letters
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,

    // Control keys
    Enter = 28,
    LeftCtrl = 29,
    LeftShift = 42,
    Space = 57,

    // Function keys
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,

    // Navigation
    Up = 103,
    Left = 105,
    Right = 106,
    Down = 108,
}

impl Key {
    /// Every key the virtual device must be registered with.
    pub const ALL: [Key; 49] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H,
        Key::I, Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P,
        Key::Q, Key::R, Key::S, Key::T, Key::U, Key::V, Key::W, Key::X,
        Key::Y, Key::Z,
        Key::N0, Key::N1, Key::N2, Key::N3, Key::N4,
        Key::N5, Key::N6, Key::N7, Key::N8, Key::N9,
        Key::LeftShift, Key::Enter, Key::Space, Key::LeftCtrl,
        Key::F1, Key::F2, Key::F3, Key::F4,
        Key::Up, Key::Down, Key::Left, Key::Right,
        Key::Escape,
    ];

    /// Linux input-event code for this key.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Check if this key is a modifier (shift or control).
    pub fn is_modifier(self) -> bool {
        matches!(self, Key::LeftShift | Key::LeftCtrl)
    }

    /// Name used in logs and layout listings, matching the kernel's
    /// `KEY_*` suffix.
    pub fn name(self) -> &'static str {
        match self {
            Key::Escape => "ESC",
            Key::N1 => "1",
            Key::N2 => "2",
            Key::N3 => "3",
            Key::N4 => "4",
            Key::N5 => "5",
            Key::N6 => "6",
            Key::N7 => "7",
            Key::N8 => "8",
            Key::N9 => "9",
            Key::N0 => "0",
            Key::Q => "Q",
            Key::W => "W",
            Key::E => "E",
            Key::R => "R",
            Key::T => "T",
            Key::Y => "Y",
            Key::U => "U",
            Key::I => "I",
            Key::O => "O",
            Key::P => "P",
            Key::A => "A",
            Key::S => "S",
            Key::D => "D",
            Key::F => "F",
            Key::G => "G",
            Key::H => "H",
            Key::J => "J",
            Key::K => "K",
            Key::L => "L",
            Key::Z => "Z",
            Key::X => "X",
            Key::C => "C",
            Key::V => "V",
            Key::B => "B",
            Key::N => "N",
            Key::M => "M",
            Key::Enter => "ENTER",
            Key::LeftCtrl => "LEFTCTRL",
            Key::LeftShift => "LEFTSHIFT",
            Key::Space => "SPACE",
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::Up => "UP",
            Key::Left => "LEFT",
            Key::Right => "RIGHT",
            Key::Down => "DOWN",
        }
    }
}

/// Active key-mapping layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Plain Spectrum keys: digits on rows 0 and 3.
    #[default]
    Spectrum,
    /// Function keys, arrows and Escape replace most digits.
    Function,
}

impl Mode {
    pub const BOTH: [Mode; 2] = [Mode::Spectrum, Mode::Function];

    /// The other mode.
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Spectrum => Mode::Function,
            Mode::Function => Mode::Spectrum,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Spectrum => "Spectrum",
            Mode::Function => "Function",
        }
    }
}

/// One key per matrix cell, indexed `[row][col]`.
pub type Layout = [[Key; COLS]; ROWS];

/// Shorthand aliases for readability.
const SHFT: Key = Key::LeftShift;
const CTRL: Key = Key::LeftCtrl;
const ENT: Key = Key::Enter;
const SPC: Key = Key::Space;
const ESC: Key = Key::Escape;

/// The Spectrum matrix mapped to modern keys.
///
/// Rows follow the address lines, columns the data lines. Rows 3, 4, 6
/// and 7 are wired right-to-left on the Spectrum membrane, hence the
/// reversed ordering.
pub static SPECTRUM: Layout = [
    // Row 0: 1 2 3 4 5
    [Key::N1, Key::N2, Key::N3, Key::N4, Key::N5],
    // Row 1: Q W E R T
    [Key::Q, Key::W, Key::E, Key::R, Key::T],
    // Row 2: A S D F G
    [Key::A, Key::S, Key::D, Key::F, Key::G],
    // Row 3: 0 9 8 7 6
    [Key::N0, Key::N9, Key::N8, Key::N7, Key::N6],
    // Row 4: P O I U Y
    [Key::P, Key::O, Key::I, Key::U, Key::Y],
    // Row 5: CAPS SHIFT Z X C V
    [SHFT, Key::Z, Key::X, Key::C, Key::V],
    // Row 6: ENTER L K J H
    [ENT, Key::L, Key::K, Key::J, Key::H],
    // Row 7: SPACE SYMBOL SHIFT M N B
    [SPC, CTRL, Key::M, Key::N, Key::B],
];

/// Function-key layout. Only rows 0 and 3 differ from [`SPECTRUM`].
pub static FUNCTION: Layout = [
    // Row 0: F1 F2 F3 F4 LEFT
    [Key::F1, Key::F2, Key::F3, Key::F4, Key::Left],
    [Key::Q, Key::W, Key::E, Key::R, Key::T],
    [Key::A, Key::S, Key::D, Key::F, Key::G],
    // Row 3: ESC 9 RIGHT UP DOWN
    [ESC, Key::N9, Key::Right, Key::Up, Key::Down],
    [Key::P, Key::O, Key::I, Key::U, Key::Y],
    [SHFT, Key::Z, Key::X, Key::C, Key::V],
    [ENT, Key::L, Key::K, Key::J, Key::H],
    [SPC, CTRL, Key::M, Key::N, Key::B],
];

/// Table backing a mode.
pub fn layout(mode: Mode) -> &'static Layout {
    match mode {
        Mode::Spectrum => &SPECTRUM,
        Mode::Function => &FUNCTION,
    }
}

/// Look up the key for a matrix cell in the given mode.
///
/// `row` and `col` must be inside the fixed geometry; the scanner never
/// produces anything else.
pub fn lookup(mode: Mode, row: usize, col: usize) -> Key {
    layout(mode)[row][col]
}

/// Check whether a cell reports a different key depending on the mode.
pub fn is_mode_dependent(row: usize, col: usize) -> bool {
    SPECTRUM[row][col] != FUNCTION[row][col]
}

/// A layout cell whose key is missing from a registered vocabulary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unregistered {
    pub mode: Mode,
    pub row: usize,
    pub col: usize,
    pub key: Key,
}

/// Find the first cell, in either mode, whose key is not in `registered`.
///
/// Used at startup so an incomplete device registration fails before the
/// first sweep instead of on a key press.
pub fn find_unregistered(registered: &[Key]) -> Option<Unregistered> {
    for mode in Mode::BOTH {
        let table = layout(mode);
        for row in 0..ROWS {
            for col in 0..COLS {
                let key = table[row][col];
                if !registered.contains(&key) {
                    return Some(Unregistered { mode, row, col, key });
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cell_per_mode() {
        assert_eq!(lookup(Mode::Spectrum, 0, 0), Key::N1);
        assert_eq!(lookup(Mode::Function, 0, 0), Key::F1);
        assert_eq!(lookup(Mode::Function, 0, 0).name(), "F1");
    }

    #[test]
    fn test_letter_rows_shared_between_modes() {
        for row in [1, 2, 4, 5, 6, 7] {
            for col in 0..COLS {
                assert!(!is_mode_dependent(row, col), "cell ({row},{col})");
            }
        }
    }

    #[test]
    fn test_rows_0_and_3_differ() {
        for col in 0..COLS {
            assert!(is_mode_dependent(0, col));
        }
        // The 9 keeps its place in function mode
        let differing: Vec<usize> = (0..COLS).filter(|&c| is_mode_dependent(3, c)).collect();
        assert_eq!(differing, vec![0, 2, 3, 4]);
        assert_eq!(lookup(Mode::Function, 3, 0), Key::Escape);
        assert_eq!(lookup(Mode::Function, 3, 3), Key::Up);
    }

    #[test]
    fn test_vocabulary_covers_both_layouts() {
        assert_eq!(find_unregistered(&Key::ALL), None);
    }

    #[test]
    fn test_unregistered_key_reported() {
        let without_f1: Vec<Key> = Key::ALL.iter().copied().filter(|&k| k != Key::F1).collect();
        assert_eq!(
            find_unregistered(&without_f1),
            Some(Unregistered { mode: Mode::Function, row: 0, col: 0, key: Key::F1 })
        );
    }

    #[test]
    fn test_vocabulary_has_no_duplicates() {
        for (i, a) in Key::ALL.iter().enumerate() {
            for b in &Key::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_codes_match_kernel() {
        assert_eq!(Key::Escape.code(), 1);
        assert_eq!(Key::N0.code(), 11);
        assert_eq!(Key::A.code(), 30);
        assert_eq!(Key::F4.code(), 62);
        assert_eq!(Key::Down.code(), 108);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::default(), Mode::Spectrum);
        assert_eq!(Mode::Spectrum.toggled(), Mode::Function);
        assert_eq!(Mode::Function.toggled(), Mode::Spectrum);
    }
}
