use std::fmt;

use uuid::Uuid;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ComponentId {
    name: String,
    uuid: Uuid,
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

impl ComponentId {
    pub fn new(name: &str) -> Self {
        ComponentId {
            name: String::from(name),
            uuid: Uuid::new_v4(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

pub trait Component: 'static {
    fn id(&self) -> &ComponentId;
}

impl PartialEq for dyn Component + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl Eq for dyn Component + '_ {}
