/// The basic starter template. Contains each splice marker exactly once.
pub const BASIC_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mi Blog Místico</title>
  <style>
    body {
      margin: 0;
      font-family: Georgia, serif;
      background: #faf7ff;
      color: #2d1b4e;
      line-height: 1.6;
    }
    .container {
      max-width: 960px;
      margin: 0 auto;
      padding: 24px;
    }
    header {
      text-align: center;
      padding: 48px 24px;
      background: #2d1b4e;
      color: #f5e9ff;
    }
    footer {
      text-align: center;
      padding: 24px;
      font-size: 0.9em;
      color: #6b5b8a;
    }
  </style>
</head>
<body>
  <header>
    <h1>Mi Blog Místico</h1>
    <p>Un espacio para la luz interior</p>
  </header>
  <main class="container">
    <p>Bienvenido. Empieza a editar tu plantilla.</p>
  </main>
  <footer>
    <p>&copy; Mi Blog Místico</p>
  </footer>
</body>
</html>
"#;
