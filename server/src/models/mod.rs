pub mod booking;
pub mod ticket;
pub mod travel;

pub use booking::{Booking, BookingStatus, BookingWithTickets, NewBooking};
pub use ticket::{NewTicket, Ticket, TicketSummary, Traveler};
pub use travel::Travel;
