// OS auto-launch registration ("Open at Login").
//
// Never cached: the menu checkbox asks the host every time it is built.

use crate::error::CoffeeError;

pub trait LoginItems {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool) -> Result<(), CoffeeError>;
}
