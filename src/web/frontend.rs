//! Embedded HTML/CSS/JS frontend for the tubestat dashboard.
//!
//! The whole page is compiled into the binary as a string constant. It only
//! holds view state (filters, sort); every derived number comes from
//! `/api/view`.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>tubestat Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #ff4e45;
  --blue: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1280px; margin: 0 auto; padding: 24px; }

header { display: flex; align-items: center; justify-content: space-between; gap: 16px;
  margin-bottom: 20px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 22px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }

form.search { display: flex; gap: 8px; flex: 1; max-width: 560px; }
input, select, button { font: inherit; color: var(--text); background: var(--surface);
  border: 1px solid var(--border); border-radius: 6px; padding: 6px 10px; }
input[type=text], input[type=password] { flex: 1; }
button { cursor: pointer; }
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; font-weight: 600; }
button:disabled { opacity: 0.5; cursor: default; }

.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius);
  padding: 16px 20px; margin-bottom: 16px; }
.card h2 { font-size: 14px; font-weight: 600; margin-bottom: 12px; color: var(--text-muted);
  text-transform: uppercase; letter-spacing: 0.5px; }

.filters { display: flex; flex-wrap: wrap; gap: 16px; align-items: center; }
.filters label { color: var(--text-muted); font-size: 12px; margin-right: 4px; }
.chips { display: inline-flex; gap: 6px; }
.chip { padding: 3px 10px; border-radius: 12px; font-size: 12px; }
.chip.on { border-color: var(--accent); color: var(--accent); }
#custom-range { display: none; gap: 6px; }

.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; margin-bottom: 16px; }
.stat-card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius);
  padding: 16px; text-align: center; }
.stat-card .value { font-size: 28px; font-weight: 700; font-family: var(--mono); color: var(--blue); }
.stat-card .label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }

.row { display: grid; grid-template-columns: 1fr 1fr 1fr; gap: 16px; }
.dist-bar { display: flex; height: 26px; border-radius: 6px; overflow: hidden; margin-bottom: 8px; }
.dist-bar .seg { display: flex; align-items: center; justify-content: center; font-size: 11px;
  font-weight: 600; color: #fff; min-width: 24px; }
.seg.shorts { background: var(--accent); } .seg.mid { background: var(--purple); } .seg.long { background: var(--blue); }
.legend { font-size: 12px; color: var(--text-muted); }

.tag-list li { display: flex; justify-content: space-between; list-style: none; padding: 2px 0; }
.tag-list .count { font-family: var(--mono); color: var(--text-muted); }
.cloud span { display: inline-block; margin: 2px 6px; color: var(--blue); }

.ai { border-left: 3px solid var(--purple); }
.ai p { white-space: pre-wrap; }
.muted { color: var(--text-muted); }
.error { color: var(--red); }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th { text-align: left; color: var(--text-muted); font-weight: 500; padding: 8px 6px;
  border-bottom: 1px solid var(--border); cursor: pointer; user-select: none; white-space: nowrap; }
th.sorted { color: var(--text); }
td { padding: 6px; border-bottom: 1px solid var(--border); vertical-align: middle; }
td.num { text-align: right; font-family: var(--mono); }
td img { width: 96px; border-radius: 4px; display: block; }
td a { color: var(--text); text-decoration: none; }
td a:hover { color: var(--accent); }
.tier { font-size: 11px; font-weight: 600; padding: 2px 8px; border-radius: 10px; border: 1px solid; }
.tier.VERY_HIGH { color: var(--red); } .tier.HIGH { color: var(--yellow); }
.tier.NORMAL { color: var(--green); } .tier.LOW, .tier.VERY_LOW { color: var(--text-muted); }

.toast { position: fixed; bottom: 24px; right: 24px; padding: 10px 16px; border-radius: 6px;
  background: var(--surface); border: 1px solid var(--border); opacity: 0; transition: opacity 0.2s; }
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span class="logo">tubestat</span> YouTube analysis</h1>
    <form class="search" id="search-form">
      <input type="text" id="query" placeholder="Search keyword">
      <button class="primary" id="search-btn" type="submit">Search</button>
    </form>
    <form class="search" id="key-form" style="max-width: 320px">
      <input type="password" id="api-key" placeholder="YouTube API key">
      <button type="submit">Save</button>
    </form>
  </header>

  <div class="card">
    <div class="filters">
      <div><label>Type</label>
        <select id="f-type"><option value="all">All</option><option value="short">Shorts (&lt;3m)</option><option value="long">Long (20m+)</option></select></div>
      <div><label>Published</label>
        <select id="f-date"><option value="all">Any time</option><option value="7d">7 days</option>
          <option value="30d">30 days</option><option value="90d">90 days</option><option value="custom">Custom</option></select>
        <span id="custom-range"><input type="date" id="f-start"><input type="date" id="f-end"></span></div>
      <div><label>Influence</label><span class="chips" id="f-influence"></span></div>
      <div style="margin-left:auto"><button id="export-btn">Export CSV</button></div>
    </div>
  </div>

  <div id="status" class="card muted">Enter a keyword to start.</div>

  <div id="results" style="display:none">
    <div class="stats-grid">
      <div class="stat-card"><div class="value" id="s-count">&mdash;</div><div class="label">Videos</div></div>
      <div class="stat-card"><div class="value" id="s-views">&mdash;</div><div class="label">Avg views</div></div>
      <div class="stat-card"><div class="value" id="s-vph">&mdash;</div><div class="label">Avg VPH</div></div>
      <div class="stat-card"><div class="value" id="s-ratio">&mdash;</div><div class="label">Avg views / subs</div></div>
    </div>

    <div class="card ai"><h2>AI trend summary</h2><p id="ai-text" class="muted">&mdash;</p></div>

    <div class="row">
      <div class="card"><h2>Formats</h2><div class="dist-bar" id="type-bar"></div><div class="legend" id="type-legend"></div></div>
      <div class="card"><h2>Top tags</h2><ul class="tag-list" id="top-tags"></ul></div>
      <div class="card"><h2>Related keywords</h2><div class="cloud" id="cloud"></div></div>
    </div>

    <div class="card">
      <table>
        <thead><tr id="table-head"></tr></thead>
        <tbody id="table-body"></tbody>
      </table>
    </div>
  </div>
</div>
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const TIERS = ['VERY_HIGH', 'HIGH', 'NORMAL', 'LOW', 'VERY_LOW'];
const COLUMNS = [
  ['thumbnail', ''], ['title', 'Title'], ['channelTitle', 'Channel'], ['viewCount', 'Views'],
  ['vph', 'VPH'], ['subscriberCount', 'Subscribers'], ['performanceRatio', 'Ratio'],
  ['influenceTier', 'Influence'], ['durationSec', 'Length'], ['publishedAt', 'Published'],
];
let sort = { field: 'viewCount', order: 'desc' };
let influence = new Set();
let generation = 0;
let summaryPending = false;
let summaryEnabled = false;
let pollTimer = null;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function fmt(n) { return n === undefined || n === null ? '-' : n.toLocaleString(); }
function esc(s) { const d = document.createElement('div'); d.textContent = s; return d.innerHTML; }
function duration(sec) {
  const h = Math.floor(sec / 3600), m = Math.floor((sec % 3600) / 60), s = sec % 60;
  const pad = n => String(n).padStart(2, '0');
  return h > 0 ? `${h}:${pad(m)}:${pad(s)}` : `${m}:${pad(s)}`;
}

function viewQuery(extra) {
  const p = new URLSearchParams();
  p.set('type', document.getElementById('f-type').value);
  p.set('date', document.getElementById('f-date').value);
  p.set('start', document.getElementById('f-start').value);
  p.set('end', document.getElementById('f-end').value);
  influence.forEach(t => p.append('influence', t));
  p.set('sort', sort.field);
  p.set('order', sort.order);
  Object.entries(extra || {}).forEach(([k, v]) => p.set(k, v));
  return p.toString();
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
async function refresh(extra) {
  let view;
  try {
    view = await api('GET', '/api/view?' + viewQuery(extra));
  } catch (e) {
    toast(e.message, true);
    return;
  }
  sort = view.sort;
  summaryPending = view.summaryPending;
  schedulePoll();
  renderStatus(view);
  if (!view.fetched) return;

  const stats = view.stats;
  document.getElementById('s-count').textContent = `${view.records.length} / ${view.fetched}`;
  document.getElementById('s-views').textContent = stats ? fmt(stats.avgViews) : '-';
  document.getElementById('s-vph').textContent = stats ? fmt(stats.avgVph) : '-';
  document.getElementById('s-ratio').textContent = stats ? (stats.avgPerformanceRatio * 100).toFixed(1) + '%' : '-';

  const ai = document.getElementById('ai-text');
  ai.textContent = stats && stats.aiAnalysis ? stats.aiAnalysis
    : summaryPending ? 'Analyzing...'
    : summaryEnabled ? '-' : 'AI analysis is disabled.';

  renderTypes(stats);
  document.getElementById('top-tags').innerHTML = stats
    ? stats.topTags.map(t => `<li><span>#${esc(t.tag)}</span><span class="count">${t.count}</span></li>`).join('')
    : '';
  document.getElementById('cloud').innerHTML = view.keywords
    .map(k => `<span style="font-size:${k.fontSize}px">${esc(k.word)}</span>`).join('');
  renderTable(view.records);
}

function renderStatus(view) {
  const status = document.getElementById('status');
  const results = document.getElementById('results');
  if (view.state === 'failed') {
    status.innerHTML = `<span class="error">${esc(view.error || 'Search failed')}</span>`;
  } else if (view.state === 'fetching') {
    status.textContent = 'Searching...';
  } else if (view.state === 'ready' && view.fetched === 0) {
    status.textContent = `No videos found for "${view.query}".`;
  } else if (view.state === 'ready') {
    status.textContent = `Results for "${view.query}"`;
  }
  results.style.display = view.fetched ? '' : 'none';
}

function renderTypes(stats) {
  const bar = document.getElementById('type-bar');
  const legend = document.getElementById('type-legend');
  if (!stats) { bar.innerHTML = ''; legend.textContent = ''; return; }
  const r = stats.typeRatio, total = r.shorts + r.mid + r.long || 1;
  const seg = (cls, n) => n ? `<div class="seg ${cls}" style="width:${n / total * 100}%">${n}</div>` : '';
  bar.innerHTML = seg('shorts', r.shorts) + seg('mid', r.mid) + seg('long', r.long);
  legend.textContent = `Shorts ${r.shorts} /  Mid ${r.mid} /  Long ${r.long}`;
}

function renderTable(records) {
  document.getElementById('table-head').innerHTML = COLUMNS.map(([key, label]) => {
    if (!label) return '<th></th>';
    const mark = sort.field === key ? (sort.order === 'asc' ? ' \u25B2' : ' \u25BC') : '';
    return `<th data-key="${key}" class="${mark ? 'sorted' : ''}">${label}${mark}</th>`;
  }).join('');

  document.getElementById('table-body').innerHTML = records.length
    ? records.map(r => `<tr>
        <td>${r.thumbnail ? `<img src="${esc(r.thumbnail)}" alt="">` : ''}</td>
        <td><a href="https://www.youtube.com/watch?v=${encodeURIComponent(r.id)}" target="_blank">${esc(r.title)}</a></td>
        <td>${esc(r.channelTitle)}</td>
        <td class="num">${fmt(r.viewCount)}</td>
        <td class="num">${fmt(r.vph)}</td>
        <td class="num">${fmt(r.subscriberCount)}</td>
        <td class="num">${(r.performanceRatio * 100).toFixed(1)}%</td>
        <td><span class="tier ${r.influenceTier}">${r.influenceTier}</span></td>
        <td class="num">${duration(r.durationSec)}</td>
        <td>${esc(r.publishedAt.split('T')[0])}</td>
      </tr>`).join('')
    : '<tr><td colspan="10" class="muted">No videos match the current filters.</td></tr>';
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------
async function search(query) {
  const btn = document.getElementById('search-btn');
  btn.disabled = true;
  document.getElementById('status').textContent = 'Searching...';
  try {
    const res = await api('POST', '/api/search', { query });
    generation = res.generation;
    await refresh();
  } catch (e) {
    toast(e.message, true);
    await refresh();
  } finally {
    btn.disabled = false;
  }
}

// The summary is generated server-side in the background; poll until the
// current search has one.
function schedulePoll() {
  clearTimeout(pollTimer);
  if (summaryPending) pollTimer = setTimeout(() => refresh(), 1500);
}

document.getElementById('search-form').addEventListener('submit', e => {
  e.preventDefault();
  const q = document.getElementById('query').value.trim();
  if (q) search(q);
});

document.getElementById('key-form').addEventListener('submit', async e => {
  e.preventDefault();
  const input = document.getElementById('api-key');
  try {
    const res = await api('PUT', '/api/key', { key: input.value });
    input.value = '';
    input.placeholder = res.set ? res.masked : 'YouTube API key';
    toast(res.set ? 'API key saved' : 'API key cleared');
  } catch (err) {
    toast(err.message, true);
  }
});

document.getElementById('table-head').addEventListener('click', e => {
  const key = e.target.dataset && e.target.dataset.key;
  if (key) refresh({ click: key });
});

['f-type', 'f-start', 'f-end'].forEach(id =>
  document.getElementById(id).addEventListener('change', () => refresh()));
document.getElementById('f-date').addEventListener('change', e => {
  document.getElementById('custom-range').style.display = e.target.value === 'custom' ? 'inline-flex' : 'none';
  refresh();
});

const chips = document.getElementById('f-influence');
chips.innerHTML = TIERS.map(t => `<button class="chip" data-tier="${t}">${t.replace('_', ' ')}</button>`).join('');
chips.addEventListener('click', e => {
  const tier = e.target.dataset && e.target.dataset.tier;
  if (!tier) return;
  influence.has(tier) ? influence.delete(tier) : influence.add(tier);
  e.target.classList.toggle('on', influence.has(tier));
  refresh();
});

document.getElementById('export-btn').addEventListener('click', async () => {
  const res = await fetch('/api/export.csv?' + viewQuery());
  if (res.status === 204) { toast('Nothing to export', true); return; }
  if (!res.ok) { toast('Export failed', true); return; }
  const disposition = res.headers.get('Content-Disposition') || '';
  const match = disposition.match(/filename\*=UTF-8''([^;]+)/);
  const a = document.createElement('a');
  a.href = URL.createObjectURL(await res.blob());
  a.download = match ? decodeURIComponent(match[1]) : 'youtube_analysis.csv';
  a.click();
  URL.revokeObjectURL(a.href);
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
(async () => {
  try {
    const state = await api('GET', '/api/state');
    sort = state.defaults.sort;
    summaryEnabled = state.summarizer.enabled;
    generation = state.generation;
    if (state.hasKey) {
      const key = await api('GET', '/api/key');
      document.getElementById('api-key').placeholder = key.masked;
    } else {
      toast('Set your YouTube API key first', true);
    }
    if (state.generation) {
      document.getElementById('query').value = state.query;
      refresh();
    }
  } catch (e) {
    toast(e.message, true);
  }
})();
</script>
</body>
</html>
"##;
