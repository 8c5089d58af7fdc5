#![cfg(feature = "simulator")]

mod scene_common;

use afton::{game::Phase, input::Button, reg, resources};
use scene_common::{hold_until, start};

#[test]
fn runs_forever_without_a_guest() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    let ended = hold_until(&mut bus, &mut game, Button::RIGHT, 2000, |phase, _| {
        phase != Phase::Playing
    });

    assert_eq!(ended, None);
    assert!(game.guest().is_none());
    // no music in this scene
    assert!(bus.sound_stream(1).is_none());
}

#[test]
fn one_frame_per_vertical_blank() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    hold_until(&mut bus, &mut game, Button::RIGHT | Button::A, 300, |_, _| false);

    assert_eq!(bus.frames(), 300);
}

#[test]
fn video_memory_is_only_touched_in_the_blank() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    hold_until(&mut bus, &mut game, Button::LEFT | Button::A, 300, |_, _| false);

    assert!(game.camera() < 0);
    assert_eq!(bus.video_writes_outside_vblank(), 0);
}

#[test]
fn scroll_register_follows_the_camera() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    hold_until(&mut bus, &mut game, Button::RIGHT, 84 + 20, |_, _| false);

    assert_eq!(game.camera(), 20);
    assert_eq!(bus.peek16(reg::background_offset_horizontal(0)), 20);
}

#[test]
fn jumping_lands_back_on_the_ground() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    let took_off = hold_until(&mut bus, &mut game, Button::A, 5, |_, game| {
        game.player().is_falling()
    });
    assert!(took_off.is_some());

    let landed = hold_until(&mut bus, &mut game, Button::empty(), 200, |_, game| {
        !game.player().is_falling()
    });
    assert!(landed.is_some());

    let player = game.player();
    assert_eq!(player.position().y, 113);
    assert_eq!(player.position().y % 4, 1);
}

#[test]
fn can_jump_onto_a_platform() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    // the first platform is tile columns 26 to 30 and the player's feet start
    // in column 13, so walk until the feet are over column 28
    let arrived = hold_until(&mut bus, &mut game, Button::RIGHT, 400, |_, game| {
        (game.player().position().x + 8 + game.camera()) / 8 == 27
    });
    assert!(arrived.is_some());

    hold_until(&mut bus, &mut game, Button::RIGHT | Button::A, 3, |_, _| false);
    let landed = hold_until(&mut bus, &mut game, Button::RIGHT, 200, |_, game| {
        !game.player().is_falling()
    });
    assert!(landed.is_some());

    // standing on row 14 rather than the ground on row 18
    let y = game.player().position().y;
    assert_eq!((y + 32) / 8, 14);
    assert_eq!(y % 4, 1);
}

#[test]
fn sprite_table_holds_only_the_player() {
    let (mut bus, mut game) = start(&resources::COLLIDE);

    hold_until(&mut bus, &mut game, Button::empty(), 1, |_, _| false);

    assert_eq!(game.sprites().allocated(), 1);
    // y of the first entry, then the rest are parked off screen
    assert_eq!(bus.oam()[0] & 0xff, 113);
    assert_eq!(bus.oam()[4] & 0xff, 160);
}
