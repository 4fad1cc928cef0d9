use crate::calendar::{CalendarGrid, WEEKDAY_HEADERS};
use crate::card::EmployeeCard;
use crate::models::{FilterState, YearMonth};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn render_dashboard(
    filters: &FilterState,
    month: YearMonth,
    cards: &[EmployeeCard],
    notice: Option<&str>,
) -> String {
    INDEX_HTML
        .replace("{{TITLE}}", &month.title())
        .replace("{{YEAR_OPTIONS}}", &year_options(month.year()))
        .replace("{{MONTH_OPTIONS}}", &month_options(month.month0()))
        .replace("{{NAME_FILTER}}", &escape_html(&filters.name_filter))
        .replace("{{CARDS}}", &render_cards(cards, notice))
}

/// Card list for one month; also served alone so the page can swap it in.
pub fn render_cards(cards: &[EmployeeCard], notice: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(notice) = notice {
        html.push_str(&format!(
            r#"<div class="status" data-type="error">{}</div>"#,
            escape_html(notice)
        ));
    }
    if cards.is_empty() {
        html.push_str(r#"<p class="hint">No employees match the current filter.</p>"#);
    }
    for card in cards {
        html.push_str(&render_card(card));
    }
    html
}

fn render_card(card: &EmployeeCard) -> String {
    let name = escape_html(&card.employee.name);
    let summary = &card.summary;
    format!(
        r#"<article class="card">
  <header class="card-head">
    <h3>{name}</h3>
    <p class="subtitle">{position}</p>
  </header>
  <div class="totals">
    <div class="stat"><span class="label">Full days</span><span class="value">{full}</span></div>
    <div class="stat"><span class="label">Half days</span><span class="value">{half}</span></div>
    <div class="stat"><span class="label">Absent</span><span class="value net">{absent}</span></div>
  </div>
  <p class="hint">Paid leave: {paid} &middot; Activities: {activity}</p>
  {grid}
</article>
"#,
        position = escape_html(&card.employee.position),
        full = summary.full_days,
        half = summary.half_days,
        absent = summary.absent_days,
        paid = card.breakdown.paid_days,
        activity = card.breakdown.activity_days,
        grid = render_grid(&card.calendar, &card.employee.name),
    )
}

fn render_grid(grid: &CalendarGrid, employee_name: &str) -> String {
    let mut html = String::from(r#"<div class="calendar">"#);
    for header in WEEKDAY_HEADERS {
        html.push_str(&format!(r#"<span class="weekday">{header}</span>"#));
    }
    for week in grid.weeks() {
        for slot in week {
            match slot {
                Some(cell) => {
                    let click = grid.click(cell, employee_name);
                    let class = if cell.is_weekly_off {
                        format!("{} weekly-off", cell.category.as_str())
                    } else {
                        cell.category.as_str().to_string()
                    };
                    html.push_str(&format!(
                        r#"<button type="button" class="day {class}" data-date="{date}" data-employee="{employee}" title="{date}: {label}">{day}</button>"#,
                        date = click.date,
                        employee = escape_html(&click.employee_name),
                        label = cell.label,
                        day = cell.day_of_month,
                    ));
                }
                None => html.push_str(r#"<span class="day blank"></span>"#),
            }
        }
    }
    html.push_str("</div>");
    html
}

fn year_options(selected: i32) -> String {
    (selected - 3..=selected + 1)
        .map(|year| {
            let flag = if year == selected { " selected" } else { "" };
            format!(r#"<option value="{year}"{flag}>{year}</option>"#)
        })
        .collect()
}

fn month_options(selected0: u32) -> String {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let flag = if index as u32 == selected0 { " selected" } else { "" };
            format!(r#"<option value="{index}"{flag}>{name}</option>"#)
        })
        .collect()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendance</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      --full: #2d7a4b;
      --half: #e0a526;
      --absent: #c63b2b;
      --paid: #3b6fc6;
      --activity: #8a4fc6;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h3 {
      margin: 0;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 0.95rem;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    .filters select,
    .filters input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 999px;
      padding: 10px 16px;
      font: inherit;
      background: white;
    }

    #cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 14px;
    }

    .totals {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 10px;
    }

    .stat {
      display: grid;
      gap: 4px;
    }

    .stat .label {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.net {
      color: var(--accent);
    }

    .calendar {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 4px;
    }

    .weekday {
      font-size: 0.7rem;
      text-align: center;
      color: #8b857d;
    }

    .day {
      appearance: none;
      border: none;
      border-radius: 8px;
      padding: 6px 0;
      font: inherit;
      font-size: 0.85rem;
      color: white;
      cursor: pointer;
    }

    .day.blank {
      background: transparent;
      cursor: default;
    }

    .day.full-day { background: var(--full); }
    .day.half-day { background: var(--half); }
    .day.absent { background: var(--absent); }
    .day.paid { background: var(--paid); }
    .day.activity { background: var(--activity); }
    .day.weekly-off { opacity: 0.55; }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      grid-column: 1 / -1;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    dialog {
      border: none;
      border-radius: 20px;
      padding: 24px;
      width: min(460px, 90vw);
      box-shadow: var(--shadow);
    }

    dialog ul {
      padding-left: 18px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Attendance</h1>
      <p class="subtitle" id="title">{{TITLE}}</p>
    </header>

    <form class="filters" id="filters">
      <select id="year" name="year">{{YEAR_OPTIONS}}</select>
      <select id="month" name="month">{{MONTH_OPTIONS}}</select>
      <input id="name" name="name" type="search" placeholder="Filter by name" value="{{NAME_FILTER}}" />
    </form>

    <section id="cards">{{CARDS}}</section>
    <p class="hint">Sundays count as full days. Click a day to see that day's visits.</p>
  </main>

  <dialog id="visits">
    <h3 id="visits-title"></h3>
    <div id="visits-body"></div>
    <form method="dialog"><button type="submit">Close</button></form>
  </dialog>

  <script>
    const yearEl = document.getElementById('year');
    const monthEl = document.getElementById('month');
    const nameEl = document.getElementById('name');
    const titleEl = document.getElementById('title');
    const cardsEl = document.getElementById('cards');
    const dialogEl = document.getElementById('visits');
    const visitsTitleEl = document.getElementById('visits-title');
    const visitsBodyEl = document.getElementById('visits-body');

    // Only the newest request may update the page.
    let generation = 0;
    let nameTimer = null;
    // Saves run one at a time; a save queued behind a newer selection is dropped.
    let saveQueue = Promise.resolve();

    const escapeText = (value) => {
      const span = document.createElement('span');
      span.textContent = value == null ? '' : String(value);
      return span.innerHTML;
    };

    const currentFilters = () => ({
      selectedYear: Number(yearEl.value),
      selectedMonth: Number(monthEl.value),
      nameFilter: nameEl.value
    });

    const refresh = async () => {
      const filters = currentFilters();
      const token = ++generation;
      titleEl.textContent = `${monthEl.options[monthEl.selectedIndex].text} ${filters.selectedYear}`;
      saveQueue = saveQueue
        .then(() => {
          if (token !== generation) {
            return;
          }
          return fetch('/api/filters', {
            method: 'PUT',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(filters)
          });
        })
        .catch(() => {});
      try {
        const params = new URLSearchParams({
          year: filters.selectedYear,
          month: filters.selectedMonth + 1,
          name: filters.nameFilter
        });
        const response = await fetch(`/fragments/cards?${params}`);
        const html = await response.text();
        if (token !== generation) {
          return;
        }
        cardsEl.innerHTML = html;
      } catch (err) {
        if (token === generation) {
          cardsEl.innerHTML = '<div class="status" data-type="error">Could not load attendance.</div>';
        }
      }
    };

    yearEl.addEventListener('change', refresh);
    monthEl.addEventListener('change', refresh);
    nameEl.addEventListener('input', () => {
      clearTimeout(nameTimer);
      nameTimer = setTimeout(refresh, 250);
    });

    cardsEl.addEventListener('click', async (event) => {
      const day = event.target.closest('button.day');
      if (!day) {
        return;
      }
      const params = new URLSearchParams({ date: day.dataset.date, employee: day.dataset.employee });
      visitsTitleEl.textContent = `${day.dataset.employee} on ${day.dataset.date}`;
      visitsBodyEl.innerHTML = '<p class="hint">Loading visits...</p>';
      dialogEl.showModal();
      try {
        const response = await fetch(`/api/visits?${params}`);
        const data = await response.json();
        if (data.notice) {
          visitsBodyEl.innerHTML = `<p class="status" data-type="error">${escapeText(data.notice)}</p>`;
        } else if (!data.visits || !data.visits.length) {
          visitsBodyEl.innerHTML = '<p class="hint">No visits recorded.</p>';
        } else {
          visitsBodyEl.innerHTML = '<ul>' + data.visits
            .map((visit) => `<li><strong>${escapeText(visit.customer)}</strong> ${escapeText(visit.time)} &middot; ${escapeText(visit.purpose)}</li>`)
            .join('') + '</ul>';
        }
      } catch (err) {
        visitsBodyEl.innerHTML = '<p class="status" data-type="error">Could not load visits.</p>';
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::build_cards;
    use crate::models::{AttendanceRecord, Employee, EmployeeId};
    use crate::resolver::CalendarPolicy;

    fn sample_cards() -> Vec<EmployeeCard> {
        let employees = vec![Employee {
            id: EmployeeId::from("1"),
            name: "Asha <Rao>".into(),
            position: "Area Manager".into(),
        }];
        let records = vec![AttendanceRecord::new("1", "2024-03-05", "Half Day")];
        let month = YearMonth::new(2024, 3).unwrap();
        build_cards(&employees, &records, month, "", &CalendarPolicy::default())
    }

    #[test]
    fn dashboard_marks_selected_filters() {
        let filters = FilterState {
            selected_year: 2024,
            selected_month: 2,
            name_filter: "a\"b".into(),
        };
        let month = filters.month().unwrap();
        let html = render_dashboard(&filters, month, &sample_cards(), None);
        assert!(html.contains("March 2024"));
        assert!(html.contains(r#"<option value="2" selected>March</option>"#));
        assert!(html.contains(r#"<option value="2024" selected>2024</option>"#));
        assert!(html.contains(r#"value="a&quot;b""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn cards_escape_names_and_carry_click_data() {
        let html = render_cards(&sample_cards(), None);
        assert!(html.contains("Asha &lt;Rao&gt;"));
        assert!(html.contains(r#"data-date="2024-03-05" data-employee="Asha &lt;Rao&gt;""#));
        assert!(html.contains(r#"class="day half-day""#));
        assert!(html.contains(r#"class="day full-day weekly-off""#));
        // March 2024 starts on a Friday: five leading and six trailing blanks.
        assert_eq!(html.matches(r#"class="day blank""#).count(), 11);
    }

    #[test]
    fn notice_and_empty_state_are_shown() {
        let html = render_cards(&[], Some("No attendance data available for this month."));
        assert!(html.contains("No attendance data available"));
        assert!(html.contains("No employees match"));
    }

    #[test]
    fn filter_saves_are_serialized_and_skip_stale_selections() {
        let script = &INDEX_HTML[INDEX_HTML.find("<script>").unwrap()..];
        let queued = script.find("saveQueue = saveQueue").unwrap();
        let stale_check = script[queued..].find("if (token !== generation)").unwrap();
        let put = script[queued..].find("method: 'PUT'").unwrap();
        assert!(stale_check < put);
        assert_eq!(script.matches("method: 'PUT'").count(), 1);
    }
}
