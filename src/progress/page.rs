//! Static content of the progress page.

/// Favicon served by redirect.
pub const FAVICON_URL: &str =
    "https://raw.githubusercontent.com/jupyterhub/jupyterhub/main/share/jupyterhub/static/favicon.ico";

/// Status page; the browser reloads it every 30 seconds.
pub const STATUS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>The Littlest JupyterHub</title>
  <meta http-equiv="refresh" content="30">
  <meta http-equiv="content-type" content="text/html; charset=utf-8">
  <meta name="viewport" content="width=device-width">
  <style>
    body { font-family: sans-serif; color: grey; text-align: center; }
    .logo { width: 150px; height: auto; margin-top: 50px; }
    .spinner {
      width: 120px;
      height: 120px;
      margin: 50px auto 0;
      border-radius: 50%;
      border: 7px solid #fce5cf;
      border-top-color: #f17c0e;
      animation: spin 2s infinite linear;
    }
    .title { font-size: 30px; font-weight: bold; margin-top: 50px; }
    .hint { font-size: 13px; font-style: italic; margin-top: 10px; }
    .logs {
      margin-top: 15px;
      border: 0;
      color: white;
      padding: 15px 32px;
      font-size: 16px;
      cursor: pointer;
      background: #f5a252;
    }
    .logs:hover { background: grey; }
    @keyframes spin { to { transform: rotate(360deg); } }
  </style>
</head>
<body>
  <img class="logo" src="https://raw.githubusercontent.com/jupyterhub/the-littlest-jupyterhub/HEAD/docs/_static/images/logo/logo.png">
  <div class="spinner"></div>
  <div class="title">Please wait while your TLJH is setting up...</div>
  <p>Click the button below to see the logs</p>
  <p class="hint">Tip: to update the logs, refresh the page</p>
  <button class="logs" onclick="window.location.href='/logs'">View logs</button>
</body>
</html>
"#;
