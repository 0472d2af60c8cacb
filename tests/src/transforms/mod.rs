mod pipeline;
mod polish;
mod rules;
