use afton::{
    game::{Game, Phase},
    input::Button,
    level::LevelConfig,
    simulator::SimulatedBus,
};

/// A freshly set up scene on a freshly powered on machine.
pub fn start(level: &'static LevelConfig) -> (SimulatedBus, Game) {
    let mut bus = SimulatedBus::new();
    let game = Game::new(&mut bus, level).expect("Failed to set up scene");
    (bus, game)
}

/// Holds `buttons` and steps until `done` says so, returning the number of
/// frames it took. Gives up after `limit` frames.
pub fn hold_until(
    bus: &mut SimulatedBus,
    game: &mut Game,
    buttons: Button,
    limit: usize,
    mut done: impl FnMut(Phase, &Game) -> bool,
) -> Option<usize> {
    bus.set_keys(buttons);

    for frame in 1..=limit {
        let phase = game.step(bus);
        if done(phase, game) {
            return Some(frame);
        }
    }

    None
}
