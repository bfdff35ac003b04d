pub mod cull;
pub mod entity;
pub mod gaze;
pub mod net;
pub mod registry;
pub mod skin;
pub mod world;

pub use cull::ViewportCuller;
pub use entity::{Entity, EntityId, Facing};
pub use net::{
    ClientMessage, CodecError, DEFAULT_INPUT_RATE, DEFAULT_PORT, DEFAULT_TICK_RATE, EntityRecord,
    ProtocolError, ServerMessage, decode_frame, encode_frame,
};
pub use registry::{EntityRegistry, RegistryError};
pub use skin::{GazeCircle, Skin, SkinError, SkinGeometryCache, SkinLibrary};
pub use world::World;
