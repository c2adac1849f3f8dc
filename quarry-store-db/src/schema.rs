// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database schema definitions for the repository metadata index.

/// Core schema SQL (Nodes, NodeProps, UniqueIds, ArchiveEntries)
pub const SCHEMA_SQL: &str = r#"
create table if not exists Nodes (
    id       integer primary key autoincrement not null,
    repo     text not null,
    parent   text not null,
    path     text not null,
    name     text not null,
    kind     integer not null,
    modified integer not null,
    unique (repo, path)
);

create index if not exists IndexNodesParent on Nodes(repo, parent);
create index if not exists IndexNodesName on Nodes(name);

create table if not exists NodeProps (
    node  integer not null,
    key   text not null,
    value text not null,
    foreign key (node) references Nodes(id) on delete cascade
);

create index if not exists IndexPropsKeyValue on NodeProps(key, value);
create index if not exists IndexPropsNode on NodeProps(node, key);

create table if not exists UniqueIds (
    idType    text primary key not null,
    currentId integer not null
);

create table if not exists ArchiveEntries (
    id   integer primary key not null,
    node integer not null,
    name text not null,
    foreign key (node) references Nodes(id) on delete cascade
);

create index if not exists IndexArchiveEntriesNode on ArchiveEntries(node);
"#;

/// Schema version
pub const SCHEMA_VERSION: i32 = 1;
