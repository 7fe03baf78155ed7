pub mod reaction_graph;
pub mod time_chart;
