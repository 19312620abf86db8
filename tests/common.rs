#[macro_export]
macro_rules! date {
    ( $y:expr, $m:expr, $d:expr ) => {
        chrono::NaiveDate::from_ymd_opt($y, $m, $d).unwrap()
    };
}

#[macro_export]
macro_rules! week {
    ( $y:expr, $w:expr ) => {
        life_calendar::WeekCoordinate::new($y, $w)
    };
}
