//! Fixed text of the Service Desk reference manual.

use crate::model::{Manual, Section};

/// Title printed centred at the top of the first page.
pub const DOCUMENT_TITLE: &str = "Service Desk - Documentacion Completa";

pub const ARCHITECTURE: Section = Section::new(
    "1. ARQUITECTURA",
    "
Stack Tecnologico:
- Backend: NestJS 10.x
- Frontend: React + Vite 7.x
- Base de Datos: PostgreSQL 15
- Cache: Redis 7
- Proxy: Nginx Alpine

Contenedores Docker:
- servicedesk-nginx: Puerto 80, 443 (Proxy + SSL)
- servicedesk-api: Puerto 3000 (API REST)
- servicedesk-web: Puerto 5173 (Frontend)
- servicedesk-db: Puerto 5432 (PostgreSQL)
- servicedesk-redis: Puerto 6379 (Redis)
",
);

pub const MODULES: Section = Section::new(
    "2. MODULOS Y FUNCIONALIDADES",
    "
- Autenticacion (JWT + bcryptjs)
- Gestion de Usuarios (CRUD + Roles)
- Tickets (CRUD + Estados + Prioridades)
- Agentes (Perfiles + Habilidades + Capacidad)
- Auto-Asignacion (Algoritmo de scoring)
- Dashboard (Widgets + Metricas)
- SLA (Politicas + Monitor + Notificaciones)
- Notificaciones WebSocket (Tiempo real)
- Auditoria (Logs de acciones)
- Knowledge Base (Articulos + Categorias)
- Macros (Plantillas + Automatizacion)
- Gamificacion (Logros + Rankings)
- Email (SMTP + Notificaciones)
- Reportes (Programados + Exportacion)
- Settings (Configuracion global)
",
);

pub const SECURITY: Section = Section::new(
    "3. SEGURIDAD",
    "
- SSL/TLS con certificados
- Helmet.js headers de seguridad
- Rate Limiting (100 req/min)
- CORS configurado
- JWT tokens
- bcryptjs hash de contrasenas

Variables de Entorno Requeridas:
- NODE_ENV
- DB_HOST, DB_PORT, DB_USERNAME, DB_PASSWORD
- JWT_SECRET
- CORS_ORIGIN
- REDIS_URL
",
);

pub const INSTALLATION: Section = Section::new(
    "4. INSTALACION",
    "
Pasos:
1. git clone <repo>
2. cp .env.example .env
3. cd docker/nginx && ./generate-ssl.sh
4. cd docker && docker-compose up -d
5. docker ps (verificar estado)

Puertos de Acceso:
- https://localhost (Frontend + API)
- http://localhost (Redirect a HTTPS)
- http://localhost:3000 (API directa)
- http://localhost:5173 (Frontend directo)

Credenciales por Defecto:
- Email: admin@test.com
- Password: admin123
",
);

pub const API_ENDPOINTS: Section = Section::new(
    "5. ENDPOINTS API",
    "
POST /api/auth/login - Login
POST /api/auth/register - Registro
GET /api/auth/profile - Perfil

GET/POST /api/tickets - Listar/Crear tickets
GET/PUT/DELETE /api/tickets/:id - CRUD tickets

GET/POST /api/users - Listar/Crear usuarios
GET/PUT/DELETE /api/users/:id - CRUD usuarios

GET/POST /api/agents - Listar/Crear agentes

GET /api/dashboard/stats - Estadisticas
GET /api/dashboard/kpis - KPIs
",
);

pub const TROUBLESHOOTING: Section = Section::new(
    "6. TROUBLESHOOTING",
    "
Problemas Comunes:
- Error 502: Verificar IPs de contenedores
- Login no funciona: Verificar credenciales en DB
- SSL no funciona: Verificar certificados
- Websocket no conecta: Verificar proxy nginx

Ver Logs:
- docker logs servicedesk-api
- docker logs servicedesk-nginx
- docker logs servicedesk-db
",
);

/// All sections in the order they are printed.
pub const SECTIONS: [Section; 6] = [
    ARCHITECTURE,
    MODULES,
    SECURITY,
    INSTALLATION,
    API_ENDPOINTS,
    TROUBLESHOOTING,
];

/// Returns the Service Desk manual ready to be rendered.
pub fn service_desk_manual() -> Manual {
    Manual::new(DOCUMENT_TITLE).with_sections(SECTIONS)
}
