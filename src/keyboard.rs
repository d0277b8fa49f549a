/// QWERTY rows used by the on-screen keyboard, top to bottom. The final row
/// is the spacebar.
pub const QWERTY_ROWS: [&str; 5] = [
    "`1234567890-=",
    "qwertyuiop[]\\",
    "asdfghjkl;'",
    "zxcvbnm,./",
    " ",
];

/// Finger assignment for touch-typing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
    Thumb,
}

impl Finger {
    /// Short name for the touch-typing hint under the keyboard pane.
    pub fn label(self) -> &'static str {
        match self {
            Finger::LeftPinky => "left pinky",
            Finger::LeftRing => "left ring",
            Finger::LeftMiddle => "left middle",
            Finger::LeftIndex => "left index",
            Finger::RightIndex => "right index",
            Finger::RightMiddle => "right middle",
            Finger::RightRing => "right ring",
            Finger::RightPinky => "right pinky",
            Finger::Thumb => "thumb",
        }
    }
}

pub fn finger_for_key(key: char) -> Option<Finger> {
    use Finger::*;
    let key = key.to_ascii_lowercase();
    let finger = match key {
        '`' | '1' | 'q' | 'a' | 'z' => LeftPinky,
        '2' | 'w' | 's' | 'x' => LeftRing,
        '3' | 'e' | 'd' | 'c' => LeftMiddle,
        '4' | '5' | 'r' | 't' | 'f' | 'g' | 'v' | 'b' => LeftIndex,
        '6' | '7' | 'y' | 'u' | 'h' | 'j' | 'n' | 'm' => RightIndex,
        '8' | 'i' | 'k' | ',' => RightMiddle,
        '9' | 'o' | 'l' | '.' => RightRing,
        '0' | '-' | '=' | 'p' | '[' | ']' | '\\' | ';' | '\'' | '/' => RightPinky,
        ' ' => Thumb,
        _ => return None,
    };
    Some(finger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_key_has_a_finger() {
        for row in QWERTY_ROWS {
            for key in row.chars() {
                assert!(
                    finger_for_key(key).is_some(),
                    "no finger assigned for {key:?}"
                );
            }
        }
    }

    #[test]
    fn test_finger_assignment_ignores_case() {
        assert_eq!(finger_for_key('F'), Some(Finger::LeftIndex));
        assert_eq!(finger_for_key('f'), Some(Finger::LeftIndex));
        assert_eq!(finger_for_key('J'), Some(Finger::RightIndex));
    }

    #[test]
    fn test_unknown_keys_have_no_finger() {
        assert_eq!(finger_for_key('é'), None);
        assert_eq!(finger_for_key('\t'), None);
    }

    #[test]
    fn test_finger_labels_name_hand_and_finger() {
        assert_eq!(finger_for_key('a').unwrap().label(), "left pinky");
        assert_eq!(finger_for_key('J').unwrap().label(), "right index");
        assert_eq!(finger_for_key(' ').unwrap().label(), "thumb");
    }
}
