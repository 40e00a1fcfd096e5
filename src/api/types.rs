/// Unique identifier for an entity in the scene.
///
/// Handed out sequentially by `EngineContext::next_id`; never reused within
/// a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);
