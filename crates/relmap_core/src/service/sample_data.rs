//! Built-in sample rows. Cross references are indexes into sibling tables.

pub(super) struct AuthorSeed {
    pub name: &'static str,
    pub surname: &'static str,
    pub born: (i32, u32, u32),
}

pub(super) struct PublisherSeed {
    pub name: &'static str,
    pub address: &'static str,
}

pub(super) struct BookSeed {
    pub title: &'static str,
    pub price: &'static str,
    pub author: usize,
    pub publisher: usize,
}

pub(super) struct BookstoreSeed {
    pub name: &'static str,
    pub owner: &'static str,
    pub address: &'static str,
    pub books: &'static [usize],
}

pub(super) const AUTHORS: &[AuthorSeed] = &[
    AuthorSeed {
        name: "Gabriel",
        surname: "García Márquez",
        born: (1927, 3, 6),
    },
    AuthorSeed {
        name: "Isabel",
        surname: "Allende",
        born: (1942, 8, 2),
    },
    AuthorSeed {
        name: "Mario",
        surname: "Vargas Llosa",
        born: (1936, 3, 28),
    },
];

pub(super) const PUBLISHERS: &[PublisherSeed] = &[
    PublisherSeed {
        name: "Penguin Random House",
        address: "Calle Gran Vía 32, Madrid",
    },
    PublisherSeed {
        name: "Planeta",
        address: "Avenida Diagonal 662, Barcelona",
    },
];

pub(super) const BOOKS: &[BookSeed] = &[
    BookSeed {
        title: "Cien años de soledad",
        price: "25.99",
        author: 0,
        publisher: 0,
    },
    BookSeed {
        title: "El amor en los tiempos del cólera",
        price: "22.50",
        author: 0,
        publisher: 0,
    },
    BookSeed {
        title: "La casa de los espíritus",
        price: "21.75",
        author: 1,
        publisher: 1,
    },
    BookSeed {
        title: "Eva Luna",
        price: "19.99",
        author: 1,
        publisher: 1,
    },
    BookSeed {
        title: "La ciudad y los perros",
        price: "24.50",
        author: 2,
        publisher: 0,
    },
    BookSeed {
        title: "La fiesta del chivo",
        price: "26.75",
        author: 2,
        publisher: 0,
    },
    BookSeed {
        title: "Crónica de una muerte anunciada",
        price: "18.99",
        author: 0,
        publisher: 1,
    },
    BookSeed {
        title: "El otoño del patriarca",
        price: "20.25",
        author: 0,
        publisher: 1,
    },
];

pub(super) const BOOKSTORES: &[BookstoreSeed] = &[
    BookstoreSeed {
        name: "El Rincón Literario",
        owner: "Ana Gómez",
        address: "Calle Mayor 12, Madrid",
        books: &[0, 2, 4, 6],
    },
    BookstoreSeed {
        name: "Libros y Más",
        owner: "Carlos Ruiz",
        address: "Avenida Libertad 45, Barcelona",
        books: &[1, 3, 5, 7],
    },
];

pub(super) struct DepartmentSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub location: &'static str,
}

/// Dates are relative to the seeding day.
pub(super) struct ProjectSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub started_months_ago: u32,
    pub ends_in_months: u32,
    pub budget: f64,
}

pub(super) struct AddressSeed {
    pub street: &'static str,
    pub city: &'static str,
    pub postal_code: &'static str,
    pub country: &'static str,
}

pub(super) struct EmployeeSeed {
    pub name: &'static str,
    pub surname: &'static str,
    pub email: &'static str,
    pub hired: (i32, u32, u32),
    pub salary: f64,
    pub address: usize,
    pub department: usize,
    pub projects: &'static [usize],
}

pub(super) const DEPARTMENTS: &[DepartmentSeed] = &[
    DepartmentSeed {
        name: "Tecnología",
        description: "Departamento de Tecnología e Innovación",
        location: "Planta 3",
    },
    DepartmentSeed {
        name: "RRHH",
        description: "Recursos Humanos",
        location: "Planta 2",
    },
    DepartmentSeed {
        name: "Marketing",
        description: "Departamento de Marketing y Ventas",
        location: "Planta 1",
    },
];

pub(super) const PROJECTS: &[ProjectSeed] = &[
    ProjectSeed {
        name: "Web Corporativa",
        description: "Rediseño de la web corporativa",
        started_months_ago: 0,
        ends_in_months: 3,
        budget: 25_000.0,
    },
    ProjectSeed {
        name: "App Móvil",
        description: "Desarrollo de app para clientes",
        started_months_ago: 0,
        ends_in_months: 6,
        budget: 45_000.0,
    },
    ProjectSeed {
        name: "CRM",
        description: "Implementación de sistema CRM",
        started_months_ago: 1,
        ends_in_months: 4,
        budget: 35_000.0,
    },
];

pub(super) const ADDRESSES: &[AddressSeed] = &[
    AddressSeed {
        street: "Calle Mayor 10",
        city: "Madrid",
        postal_code: "28001",
        country: "España",
    },
    AddressSeed {
        street: "Avenida Diagonal 100",
        city: "Barcelona",
        postal_code: "08018",
        country: "España",
    },
    AddressSeed {
        street: "Plaza Nueva 5",
        city: "Sevilla",
        postal_code: "41001",
        country: "España",
    },
    AddressSeed {
        street: "Gran Vía 30",
        city: "Madrid",
        postal_code: "28013",
        country: "España",
    },
];

pub(super) const EMPLOYEES: &[EmployeeSeed] = &[
    EmployeeSeed {
        name: "Juan",
        surname: "Pérez",
        email: "juan.perez@empresa.com",
        hired: (2020, 1, 15),
        salary: 45_000.0,
        address: 0,
        department: 0,
        projects: &[0, 1],
    },
    EmployeeSeed {
        name: "María",
        surname: "López",
        email: "maria.lopez@empresa.com",
        hired: (2019, 5, 10),
        salary: 48_000.0,
        address: 1,
        department: 0,
        projects: &[1],
    },
    EmployeeSeed {
        name: "Carlos",
        surname: "Gómez",
        email: "carlos.gomez@empresa.com",
        hired: (2021, 3, 22),
        salary: 38_000.0,
        address: 2,
        department: 1,
        projects: &[2],
    },
    EmployeeSeed {
        name: "Ana",
        surname: "Martínez",
        email: "ana.martinez@empresa.com",
        hired: (2018, 11, 5),
        salary: 52_000.0,
        address: 3,
        department: 2,
        projects: &[0, 2],
    },
];
