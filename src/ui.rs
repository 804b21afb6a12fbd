use crate::color::string_to_hex;
use crate::state::Snapshot;
use crate::strategy::StrategyKind;
use html_escape::{encode_double_quoted_attribute, encode_text};

pub fn render_index(snapshot: &Snapshot) -> String {
    let selection = &snapshot.selection;

    let options: String = snapshot
        .report
        .countries()
        .map(|name| {
            let selected = if name == selection.current_country { " selected" } else { "" };
            let value = encode_double_quoted_attribute(name);
            let text = encode_text(name);
            format!(r#"<option value="{value}"{selected}>{text}</option>"#)
        })
        .collect();

    let chips: String = selection
        .selected_countries
        .iter()
        .map(|name| {
            let color = string_to_hex(name);
            let value = encode_double_quoted_attribute(name);
            let text = encode_text(name);
            format!(
                r#"<li class="chip" data-country="{value}" style="--chip: {color}">{text} <span aria-hidden="true">&times;</span></li>"#
            )
        })
        .collect();

    let by_day = selection.strategy.kind() == StrategyKind::ByDay;

    INDEX_HTML
        .replace("{{COUNTRY_OPTIONS}}", &options)
        .replace("{{CHIPS}}", &chips)
        .replace("{{BY_DATE_CHECKED}}", if by_day { "" } else { "checked" })
        .replace("{{BY_DAY_CHECKED}}", if by_day { "checked" } else { "" })
        .replace("{{METRIC}}", selection.metric.as_str())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Pandemic Dashboard</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #23262b;
      --muted: #6b6f76;
      --accent: #2f4858;
      --card: #ffffff;
      --shadow: 0 18px 44px rgba(35, 38, 43, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 22px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    h1 {
      margin: 0 0 4px;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    select,
    button {
      font: inherit;
      padding: 8px 12px;
      border-radius: 10px;
      border: 1px solid #d5d2cb;
      background: #fff;
    }

    button {
      background: var(--accent);
      color: #fff;
      border: none;
      cursor: pointer;
    }

    .chips {
      list-style: none;
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      padding: 0;
      margin: 14px 0 0;
    }

    .chip {
      border: 2px solid var(--chip);
      color: var(--chip);
      border-radius: 999px;
      padding: 4px 12px;
      cursor: pointer;
    }

    #chart {
      width: 100%;
      height: auto;
    }

    .chart-line {
      fill: none;
      stroke-width: 2;
    }

    .chart-point {
      cursor: pointer;
    }

    .chart-grid {
      stroke: #ebe8e1;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      text-align: right;
      padding: 8px 10px;
      border-bottom: 1px solid #eeebe4;
    }

    th:first-child,
    td:first-child {
      text-align: left;
    }

    th {
      cursor: pointer;
      user-select: none;
    }

    tr.selected td:first-child {
      font-weight: 600;
    }

    .swatch {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 8px;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Pandemic Dashboard</h1>
      <p class="subtitle">Daily case counts per country. Click a point on the chart to start the axis there.</p>
    </header>

    <section class="card">
      <div class="controls">
        <select id="country">{{COUNTRY_OPTIONS}}</select>
        <button id="add" type="button">Select</button>
        <label><input type="radio" name="strategy" value="byDate" {{BY_DATE_CHECKED}} /> By date</label>
        <label><input type="radio" name="strategy" value="byDay" {{BY_DAY_CHECKED}} /> Days since first case</label>
        <select id="metric" data-current="{{METRIC}}">
          <option value="confirmed">Confirmed</option>
          <option value="deaths">Deaths</option>
          <option value="recovered">Recovered</option>
        </select>
      </div>
      <ul class="chips" id="chips">{{CHIPS}}</ul>
    </section>

    <section class="card">
      <svg id="chart" viewBox="0 0 900 360" aria-label="Cases chart" role="img"></svg>
      <div class="status" id="status"></div>
    </section>

    <section class="card">
      <table>
        <thead>
          <tr>
            <th data-sort="name">Country</th>
            <th data-sort="total">Total cases</th>
            <th data-sort="last_week">Last week</th>
            <th data-sort="growth">Weekly growth</th>
          </tr>
        </thead>
        <tbody id="table"></tbody>
      </table>
    </section>
  </main>

  <script>
    const chartEl = document.getElementById('chart');
    const chipsEl = document.getElementById('chips');
    const tableEl = document.getElementById('table');
    const statusEl = document.getElementById('status');
    const countryEl = document.getElementById('country');
    const metricEl = document.getElementById('metric');
    metricEl.value = metricEl.dataset.current;

    let revision = -1;
    let sort = { key: 'total', order: 'desc' };

    const post = async (path, body) => {
      const res = await fetch(path, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const payload = await res.json().catch(() => ({}));
        throw new Error(payload.error || 'Request failed');
      }
      return res.json();
    };

    const escapeText = (value) => {
      const span = document.createElement('span');
      span.textContent = value;
      return span.innerHTML;
    };

    const drawChart = (frame) => {
      if (frame.revision < revision) {
        return;
      }
      revision = frame.revision;

      const { labels, datasets } = frame;
      if (!labels.length || !datasets.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data to plot</text>';
        return;
      }

      const width = 900;
      const height = 360;
      const padX = 56;
      const padY = 36;
      const top = 18;

      const max = Math.max(1, ...datasets.flatMap((set) => set.data));
      const xStep = labels.length > 1 ? (width - padX * 2) / (labels.length - 1) : 0;
      const x = (index) => padX + index * xStep;
      const y = (value) => height - padY - (value / max) * (height - top - padY);

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = Math.round((max * i) / 4);
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(value)}" x2="${width - padX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${padX - 8}" y="${y(value) + 4}" text-anchor="end">${value}</text>`;
      }

      const every = Math.max(1, Math.ceil(labels.length / 12));
      const xLabels = labels
        .map((label, index) => index % every === 0
          ? `<text class="chart-label" x="${x(index)}" y="${height - padY + 18}" text-anchor="middle">${escapeText(label)}</text>`
          : '')
        .join('');

      const lines = datasets.map((set) => {
        const path = set.data
          .map((value, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(value).toFixed(2)}`)
          .join(' ');
        const points = set.data
          .map((value, index) => `<circle class="chart-point" data-index="${index}" cx="${x(index)}" cy="${y(value)}" r="3.5" fill="${set.pointBackgroundColor}"><title>${escapeText(set.label)}: ${value}</title></circle>`)
          .join('');
        return `<path class="chart-line" stroke="${set.borderColor}" d="${path}" />${points}`;
      }).join('');

      chartEl.innerHTML = `${grid}${lines}${xLabels}`;
    };

    const renderChips = (countries) => {
      chipsEl.innerHTML = countries.map((row) =>
        `<li class="chip" data-country="${escapeText(row.name)}" style="--chip: ${row.color}">${escapeText(row.name)} <span aria-hidden="true">&times;</span></li>`
      ).join('');
    };

    const loadTable = async () => {
      const res = await fetch(`/api/countries?sort=${sort.key}&order=${sort.order}`);
      const rows = await res.json();
      tableEl.innerHTML = rows.map((row) => `
        <tr class="${row.selected ? 'selected' : ''}" data-country="${escapeText(row.name)}">
          <td><span class="swatch" style="background: ${row.color}"></span>${escapeText(row.name)}</td>
          <td>${row.totalCases}</td>
          <td>${row.lastWeekCases}</td>
          <td>${row.weeklyGrowth}%</td>
        </tr>`).join('');
      const state = await (await fetch('/api/state')).json();
      renderChips(state.chips);
    };

    const act = (path, body) =>
      post(path, body)
        .then((frame) => {
          drawChart(frame);
          return loadTable();
        })
        .catch((err) => {
          statusEl.textContent = err.message;
        });

    document.getElementById('add').addEventListener('click', () => {
      act('/api/countries/add', { country: countryEl.value });
    });

    countryEl.addEventListener('input', () => {
      act('/api/current', { country: countryEl.value });
    });

    chipsEl.addEventListener('click', (event) => {
      const chip = event.target.closest('.chip');
      if (chip) {
        act('/api/countries/remove', { country: chip.dataset.country });
      }
    });

    tableEl.addEventListener('click', (event) => {
      const row = event.target.closest('tr');
      if (row) {
        act('/api/countries/toggle', { country: row.dataset.country });
      }
    });

    document.querySelectorAll('input[name="strategy"]').forEach((input) => {
      input.addEventListener('change', () => act('/api/strategy', { kind: input.value }));
    });

    metricEl.addEventListener('change', () => act('/api/metric', { metric: metricEl.value }));

    chartEl.addEventListener('click', (event) => {
      const point = event.target.closest('.chart-point');
      if (point) {
        act('/api/chart/click', { index: Number(point.dataset.index) });
      }
    });

    document.querySelectorAll('th[data-sort]').forEach((th) => {
      th.addEventListener('click', () => {
        const key = th.dataset.sort;
        sort = { key, order: sort.key === key && sort.order === 'desc' ? 'asc' : 'desc' };
        loadTable().catch((err) => {
          statusEl.textContent = err.message;
        });
      });
    });

    const refresh = async () => {
      statusEl.textContent = 'Loading report...';
      const frame = await (await fetch('/api/chart')).json();
      drawChart(frame);
      await loadTable();
      const options = await (await fetch('/api/countries?sort=name')).json();
      if (!countryEl.options.length) {
        countryEl.innerHTML = options.map((row) => `<option>${escapeText(row.name)}</option>`).join('');
      }
      statusEl.textContent = '';
    };

    refresh().catch((err) => {
      statusEl.textContent = err.message;
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatRecord;
    use crate::report::Report;
    use crate::state::Selection;
    use crate::strategy::Strategy;
    use std::sync::Arc;

    fn snapshot() -> Snapshot {
        let report = Report::from_series([
            ("Poland", vec![StatRecord::new("2020-3-4", 1)]),
            ("Trinidad & Tobago", vec![StatRecord::new("2020-3-4", 0)]),
        ]);
        let mut snapshot = Snapshot::initial(Selection::new("Poland"));
        snapshot.report = Arc::new(report);
        snapshot
    }

    #[test]
    fn renders_picker_and_chips() {
        let html = render_index(&snapshot());
        assert!(html.contains(r#"<option value="Poland" selected>Poland</option>"#));
        assert!(html.contains("Trinidad &amp; Tobago"));
        assert!(html.contains(r#"data-country="Poland""#));
        assert!(html.contains(&string_to_hex("Poland")));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn marks_active_strategy() {
        let mut snapshot = snapshot();
        snapshot.selection.strategy = Strategy::ByDay(Some(3));
        let html = render_index(&snapshot);
        assert!(html.contains(r#"value="byDay" checked"#));
        assert!(html.contains(r#"value="byDate"  />"#));
    }

    #[test]
    fn escapes_country_names_in_options_and_chips() {
        let report = Report::from_series([(r#"<b>"Oz"</b>"#, vec![StatRecord::new("2020-3-4", 1)])]);
        let mut snapshot = Snapshot::initial(Selection::new(r#"<b>"Oz"</b>"#));
        snapshot.report = Arc::new(report);

        let html = render_index(&snapshot);
        assert!(html.contains(
            r#"<option value="&lt;b&gt;&quot;Oz&quot;&lt;/b&gt;" selected>&lt;b&gt;"Oz"&lt;/b&gt;</option>"#
        ));
        assert!(html.contains(r#"data-country="&lt;b&gt;&quot;Oz&quot;&lt;/b&gt;""#));
        assert!(!html.contains(r#"<b>"Oz"</b>"#));
    }
}
