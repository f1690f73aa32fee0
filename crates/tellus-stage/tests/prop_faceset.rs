use proptest::prelude::*;
use tellus_stage::{Face, FaceSet};

fn faceset() -> impl Strategy<Value = FaceSet> {
    any::<u8>().prop_map(FaceSet::from_bits)
}

fn face() -> impl Strategy<Value = Face> {
    (0usize..6).prop_map(Face::from_index)
}

proptest! {
    #[test]
    fn from_bits_masks_to_six_bits(bits in any::<u8>()) {
        let s = FaceSet::from_bits(bits);
        prop_assert_eq!(s.bits() & !0b11_1111, 0);
    }

    #[test]
    fn complement_laws(s in faceset()) {
        prop_assert_eq!(!!s, s);
        prop_assert_eq!(s & !s, FaceSet::NONE);
        prop_assert_eq!(s | !s, FaceSet::ALL);
        prop_assert_eq!(s ^ s, FaceSet::NONE);
        prop_assert_eq!(s ^ FaceSet::NONE, s);
    }

    #[test]
    fn insert_remove_roundtrip(s in faceset(), f in face()) {
        let mut with = s;
        with.insert(f);
        prop_assert!(with.contains(f));
        let mut without = with;
        without.remove(f);
        prop_assert!(!without.contains(f));
        // Only the one bit differs.
        prop_assert_eq!((with ^ without).count(), 1);
    }

    #[test]
    fn set_matches_insert_remove(s in faceset(), f in face(), on in any::<bool>()) {
        let mut a = s;
        a.set(f, on);
        prop_assert_eq!(a.contains(f), on);
        let mut b = s;
        if on { b.insert(f) } else { b.remove(f) }
        prop_assert_eq!(a, b);
    }

    #[test]
    fn all_and_none_are_extremes(s in faceset()) {
        prop_assert_eq!(s.is_all(), s == FaceSet::ALL);
        prop_assert_eq!(s.is_none(), s == FaceSet::NONE);
        prop_assert_eq!(s & FaceSet::ALL, s);
        prop_assert_eq!(s | FaceSet::NONE, s);
    }
}

#[test]
fn face_index_roundtrip_and_opposites() {
    for f in Face::ALL {
        assert_eq!(Face::from_index(f.index()), f);
        assert_eq!(f.opposite().opposite(), f);
        let (dx, dy, dz) = f.delta();
        let (ox, oy, oz) = f.opposite().delta();
        assert_eq!((dx + ox, dy + oy, dz + oz), (0, 0, 0));
    }
}
