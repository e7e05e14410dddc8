//! The standard 45-entry facial action table.
//!
//! Order matters: it is the line order of every exported label file.

use super::LabelCategory;

pub(super) const JAW_OPEN: &str = "jawOpen";
pub(super) const TONGUE_OUT: &str = "tongueOut";
pub(super) const JAW_OPEN_INDEX: usize = 13;
pub(super) const TONGUE_OUT_INDEX: usize = 37;

/// (id, localized name, category)
pub(super) const FACIAL_ACTIONS: [(&str, &str, LabelCategory); 45] = [
    ("browDownLeft", "左眉下压", LabelCategory::Brow),
    ("browDownRight", "右眉下压", LabelCategory::Brow),
    ("browInnerUp", "眉心上扬", LabelCategory::Brow),
    ("browOuterUpLeft", "左眉外侧上扬", LabelCategory::Brow),
    ("browOuterUpRight", "右眉外侧上扬", LabelCategory::Brow),
    ("cheekPuff", "鼓腮", LabelCategory::Cheek),
    ("cheekSquintLeft", "左脸颊上提", LabelCategory::Cheek),
    ("cheekSquintRight", "右脸颊上提", LabelCategory::Cheek),
    ("noseSneerLeft", "左鼻翼上提", LabelCategory::Nose),
    ("noseSneerRight", "右鼻翼上提", LabelCategory::Nose),
    ("jawForward", "下颌前伸", LabelCategory::Jaw),
    ("jawLeft", "下颌左移", LabelCategory::Jaw),
    ("jawRight", "下颌右移", LabelCategory::Jaw),
    (JAW_OPEN, "张嘴", LabelCategory::Jaw),
    ("mouthClose", "闭嘴", LabelCategory::Mouth),
    ("mouthFunnel", "嘴唇漏斗状", LabelCategory::Mouth),
    ("mouthPucker", "撅嘴", LabelCategory::Mouth),
    ("mouthLeft", "嘴左移", LabelCategory::Mouth),
    ("mouthRight", "嘴右移", LabelCategory::Mouth),
    ("mouthSmileLeft", "左嘴角微笑", LabelCategory::Mouth),
    ("mouthSmileRight", "右嘴角微笑", LabelCategory::Mouth),
    ("mouthFrownLeft", "左嘴角下撇", LabelCategory::Mouth),
    ("mouthFrownRight", "右嘴角下撇", LabelCategory::Mouth),
    ("mouthDimpleLeft", "左酒窝", LabelCategory::Mouth),
    ("mouthDimpleRight", "右酒窝", LabelCategory::Mouth),
    ("mouthStretchLeft", "左嘴角拉伸", LabelCategory::Mouth),
    ("mouthStretchRight", "右嘴角拉伸", LabelCategory::Mouth),
    ("mouthRollLower", "下唇内卷", LabelCategory::Mouth),
    ("mouthRollUpper", "上唇内卷", LabelCategory::Mouth),
    ("mouthShrugLower", "下唇上耸", LabelCategory::Mouth),
    ("mouthShrugUpper", "上唇上耸", LabelCategory::Mouth),
    ("mouthPressLeft", "左唇按压", LabelCategory::Mouth),
    ("mouthPressRight", "右唇按压", LabelCategory::Mouth),
    ("mouthLowerDownLeft", "左下唇下拉", LabelCategory::Mouth),
    ("mouthLowerDownRight", "右下唇下拉", LabelCategory::Mouth),
    ("mouthUpperUpLeft", "左上唇上提", LabelCategory::Mouth),
    ("mouthUpperUpRight", "右上唇上提", LabelCategory::Mouth),
    (TONGUE_OUT, "伸舌", LabelCategory::Tongue),
    ("tongueUp", "舌尖上抬", LabelCategory::Tongue),
    ("tongueDown", "舌尖下压", LabelCategory::Tongue),
    ("tongueLeft", "舌头左摆", LabelCategory::Tongue),
    ("tongueRight", "舌头右摆", LabelCategory::Tongue),
    ("tongueRoll", "卷舌", LabelCategory::Tongue),
    ("tongueBulgeLeft", "舌顶左腮", LabelCategory::Tongue),
    ("tongueBulgeRight", "舌顶右腮", LabelCategory::Tongue),
];

/// Turns a camelCase id into words: `mouthSmileLeft` -> `Mouth Smile Left`.
pub(super) fn display_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for (i, ch) in id.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_indices_match_table() {
        assert_eq!(FACIAL_ACTIONS[JAW_OPEN_INDEX].0, JAW_OPEN);
        assert_eq!(FACIAL_ACTIONS[TONGUE_OUT_INDEX].0, TONGUE_OUT);
        assert_eq!(FACIAL_ACTIONS[TONGUE_OUT_INDEX].2, LabelCategory::Tongue);
    }

    #[test]
    fn test_table_ids_are_unique() {
        let ids: std::collections::HashSet<_> = FACIAL_ACTIONS.iter().map(|e| e.0).collect();
        assert_eq!(ids.len(), FACIAL_ACTIONS.len());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("mouthSmileLeft"), "Mouth Smile Left");
        assert_eq!(display_name("cheekPuff"), "Cheek Puff");
        assert_eq!(display_name(""), "");
    }
}
