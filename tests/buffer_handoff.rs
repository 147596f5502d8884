#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Draw/edit role exchange.

use strip_kit::pixel_store::{BufferPair, Role, Slot};

#[test]
fn edit_becomes_draw_after_swap() {
    let mut pair = BufferPair::<3>::new();
    pair.edit_mut()[0] = [1, 2, 3];
    pair.edit_mut()[2] = [7, 8, 9];
    assert_eq!(pair.draw()[0], [0, 0, 0]);

    pair.swap();
    assert_eq!(pair.draw(), &[[1, 2, 3], [0, 0, 0], [7, 8, 9]]);
    assert_eq!(pair.draw_bytes(), [1, 2, 3, 0, 0, 0, 7, 8, 9]);
    // The old draw buffer is handed back unchanged for editing.
    assert_eq!(pair.edit_mut(), &[[0, 0, 0]; 3]);
}

#[test]
fn two_swaps_restore_roles() {
    let mut pair = BufferPair::<2>::from_buffers([[0x11; 3]; 2], [[0x22; 3]; 2]);
    assert_eq!(pair.role_of(Slot::First), Role::Draw);
    assert_eq!(pair.role_of(Slot::Second), Role::Edit);

    pair.swap();
    assert_eq!(pair.role_of(Slot::First), Role::Edit);
    assert_eq!(pair.draw()[0], [0x22; 3]);

    pair.swap();
    assert_eq!(pair.role_of(Slot::First), Role::Draw);
    assert_eq!(pair.draw()[0], [0x11; 3]);
    assert_eq!(pair.swap_count(), 2);
}

#[test]
fn filled_pair_starts_identical() {
    let mut pair = BufferPair::<4>::filled(0x0F);
    assert!(pair.draw_bytes().iter().all(|&byte| byte == 0x0F));
    assert!(pair.edit_bytes_mut().iter().all(|&byte| byte == 0x0F));
}
