use thiserror::Error;

/// Problems found while setting a scene up.
///
/// Once a scene is running nothing can fail; these only come out of the
/// constructors that copy assets into video memory and allocate sprites.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("all {0} hardware sprites are already in use")]
    SpritesExhausted(usize),
    #[error("tile map has {actual} entries but its size needs {expected}")]
    TileMapTooShort { expected: usize, actual: usize },
    #[error("background {0} does not exist, there are only 4")]
    NoSuchBackground(usize),
    #[error("level has no layer {0} to collide with")]
    NoSuchLayer(usize),
    #[error("{what} is {len} halfwords long but only {capacity} fit")]
    AssetTooLarge {
        what: &'static str,
        len: usize,
        capacity: usize,
    },
}
