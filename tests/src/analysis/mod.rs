mod binding;
mod filtering;
