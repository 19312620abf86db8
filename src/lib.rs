pub mod catalog;
pub mod life_date;
pub mod local_storage;
pub mod model;
pub mod transfer;
pub mod week_mapper;

pub use week_mapper::{
    date_from_week_position, is_date_in_week, week_position, weeks_between, weeks_in_range,
    WeekCoordinate,
};
