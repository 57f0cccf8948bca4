pub mod setting;
pub mod team_member;
pub mod ticket;
pub mod user;

pub use setting::Setting;
pub use team_member::TeamMember;
pub use ticket::{Severity, Ticket, TicketStatus, TicketWithOwner};
pub use user::{Role, User};
