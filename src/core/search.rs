use crate::domain::model::Reservation;

/// 依團體、房間（不分大小寫）或日期字串搜尋，保留原順序
pub fn filter_reservations<'a>(reservations: &'a [Reservation], query: &str) -> Vec<&'a Reservation> {
    if query.is_empty() {
        return reservations.iter().collect();
    }

    let needle = query.to_lowercase();
    reservations
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.room.to_lowercase().contains(&needle)
                || r.date.contains(query)
        })
        .collect()
}
